//! Conversions between the three spellings of an integer: the English
//! cardinal ("ninety-nine"), the comma-grouped numeral ("99"), and the
//! machine value. Cardinals are parsed from the token stream by the parser;
//! this module holds the word values, the numeral text codec, and the
//! renderer used for published output.

use crate::error::ParseError;

/// The numeric value of a cardinal word, case-insensitive.
/// Returns `None` for words that are not part of a cardinal.
pub fn word_value(word: &str) -> Option<i64> {
    let value = match word.to_ascii_lowercase().as_str() {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        "hundred" => 100,
        "thousand" => 1_000,
        "million" => 1_000_000,
        "billion" => 1_000_000_000,
        "trillion" => 1_000_000_000_000,
        "quadrillion" => 1_000_000_000_000_000,
        "quintillion" => 1_000_000_000_000_000_000,
        _ => return None,
    };
    Some(value)
}

/// Parses the comma-grouped numeral form of an integer.
///
/// The first digit must be 1 through 9 (`"0"` is the only spelling of zero,
/// and it has no signed form), and commas must delimit every group of three
/// digits counted from the right. Overflow in either direction is an error.
pub fn parse_numeral(num: &str) -> Result<i64, ParseError> {
    if num.is_empty() {
        return Err(ParseError::InvalidNumeral);
    }
    if num == "0" {
        return Ok(0);
    }

    let (negative, num) = match num.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => (true, rest),
        Some(_) => return Err(ParseError::InvalidNumeral),
        None => (false, num),
    };

    if !matches!(num.as_bytes()[0], b'1'..=b'9') {
        return Err(ParseError::InvalidNumeral);
    }

    let mut n: i64 = 0;
    for (i, b) in num.bytes().enumerate() {
        // Commas must delimit every group of three (3) digits.
        if i % 4 == num.len() % 4 {
            if b != b',' {
                return Err(ParseError::InvalidNumeral);
            }
            continue;
        }
        if !b.is_ascii_digit() {
            return Err(ParseError::InvalidNumeral);
        }

        // Accumulate negative values digitwise so that i64::MIN parses.
        let mut d = i64::from(b - b'0');
        if negative {
            d = -d;
        }
        n = n
            .checked_mul(10)
            .and_then(|n| n.checked_add(d))
            .ok_or(ParseError::InvalidNumeral)?;
    }

    Ok(n)
}

const ONES: [&str; 10] = [
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];
const TEENS: [&str; 10] = [
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];
const POWERS: [&str; 7] = [
    "",
    "thousand",
    "million",
    "billion",
    "trillion",
    "quadrillion",
    "quintillion",
];

/// Renders `n` in the form the language publishes integers in:
/// `"<cardinal> (<numeral>)"`, e.g. `one thousand (1,000)`.
pub fn render(n: i64) -> String {
    if n == 0 {
        return "zero (0)".to_string();
    }

    let negative = n < 0;

    // Negate n groupwise rather than all at once: -i64::MIN overflows.
    let mut groups = Vec::new();
    let mut n = n;
    while n != 0 {
        let mut r = n % 1000;
        if negative {
            r = -r;
        }
        groups.push(r);
        n /= 1000;
    }

    let mut car = String::new();
    let mut num = String::new();
    for (i, &g) in groups.iter().enumerate().rev() {
        if i == groups.len() - 1 {
            num.push_str(&g.to_string());
        } else {
            num.push_str(&format!(",{:03}", g));
        }
        if g == 0 {
            continue;
        }
        if !car.is_empty() {
            car.push(' ');
        }
        car.push_str(&render_group(g));
        if i > 0 {
            car.push(' ');
            car.push_str(POWERS[i]);
        }
    }

    if negative {
        format!("negative {} (-{})", car, num)
    } else {
        format!("{} ({})", car, num)
    }
}

// Renders a single nonzero group in the range 1..=999.
fn render_group(g: i64) -> String {
    let mut car = String::new();
    let mut g = g as usize;
    if g >= 100 {
        car.push_str(ONES[g / 100]);
        car.push_str(" hundred");
        g %= 100;
        if g > 0 {
            car.push(' ');
        }
    }
    match g {
        0 => {}
        1..=9 => car.push_str(ONES[g]),
        10..=19 => car.push_str(TEENS[g - 10]),
        _ => {
            car.push_str(TENS[g / 10]);
            if g % 10 != 0 {
                car.push('-');
                car.push_str(ONES[g % 10]);
            }
        }
    }
    car
}
