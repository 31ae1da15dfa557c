use nu_ansi_term::{Color, Style};
use reedline::{
    Highlighter, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus,
    StyledText, ValidationResult, Validator,
};
use std::borrow::Cow;

use crate::tokenizer::{Lexer, Token, TokenType};

#[derive(Clone)]
pub struct REPLPrompt;

impl Prompt for REPLPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("resolution")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<str> {
        Cow::Borrowed("❯ ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("  ... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

pub struct REPLValidator;

impl Validator for REPLValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            return ValidationResult::Complete;
        }

        if trimmed.ends_with('\\') {
            return ValidationResult::Incomplete;
        }

        let mut depth: usize = 0;
        let mut in_string = false;
        for c in line.chars() {
            match c {
                '"' => in_string = !in_string,
                _ if in_string => {}
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        if in_string || depth > 0 {
            ValidationResult::Incomplete
        } else {
            ValidationResult::Complete
        }
    }
}

pub static KEYWORD_COLOR: Color = Color::LightBlue;
pub static LITERAL_COLOR: Color = Color::Yellow;
pub static DEFAULT_COLOR: Color = Color::White;
pub static OPERATOR_COLOR: Color = Color::DarkGray;

pub struct SyntaxHighlighter;

impl Highlighter for SyntaxHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();
        let mut lexer = Lexer::new(line);
        let mut remaining = line;

        loop {
            // An unterminated string leaves the rest of the line unstyled.
            let Ok(token) = lexer.next_token() else {
                break;
            };
            if token.typ == TokenType::Eof {
                break;
            }

            let text = match token.typ {
                TokenType::String => format!("\"{}\"", token.lit),
                _ => token.lit.clone(),
            };
            let Some(pos) = remaining.find(&text) else {
                break;
            };
            if pos > 0 {
                styled_text.push((Style::new().fg(DEFAULT_COLOR), remaining[..pos].to_string()));
            }
            styled_text.push((Style::new().fg(color(&token)), text.clone()));
            remaining = &remaining[pos + text.len()..];
        }

        if !remaining.is_empty() {
            styled_text.push((Style::new().fg(DEFAULT_COLOR), remaining.to_string()));
        }

        styled_text
    }
}

fn color(token: &Token) -> Color {
    match token.typ {
        TokenType::Whereas
        | TokenType::Resolved
        | TokenType::Hereinafter
        | TokenType::Publish
        | TokenType::Assume
        | TokenType::If
        | TokenType::Equals
        | TokenType::Exceeds => KEYWORD_COLOR,
        TokenType::String | TokenType::Numeral | TokenType::Integer => LITERAL_COLOR,
        _ if token.is_cardinal() => LITERAL_COLOR,
        TokenType::Twice
        | TokenType::Thrice
        | TokenType::Less
        | TokenType::Sum
        | TokenType::Product
        | TokenType::Quotient
        | TokenType::Remainder
        | TokenType::Squared
        | TokenType::Cubed
        | TokenType::LParen
        | TokenType::RParen
        | TokenType::Dash => OPERATOR_COLOR,
        _ => DEFAULT_COLOR,
    }
}
