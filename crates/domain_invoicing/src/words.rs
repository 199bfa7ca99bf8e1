//! Polish amount-in-words rendering
//!
//! Renders the integer part of a gross amount as Polish cardinal words and
//! the fractional part digit-for-digit as `NN/100` plus the minor-unit name,
//! e.g. `sto dwadzieścia trzy złote 68/100 groszy`. The decomposition is a
//! recursive walk over magnitude bands (ones, teens, tens, hundreds, then
//! thousand/million/billion groups) with Polish pluralization of the group
//! and unit names.
//!
//! The function is deterministic and side-effect free; the rendered string
//! is persisted on the invoice row for the document layer to consume.

use core_kernel::Money;

const ONES: [&str; 10] = [
    "zero", "jeden", "dwa", "trzy", "cztery", "pięć", "sześć", "siedem", "osiem", "dziewięć",
];

const TEENS: [&str; 10] = [
    "dziesięć",
    "jedenaście",
    "dwanaście",
    "trzynaście",
    "czternaście",
    "piętnaście",
    "szesnaście",
    "siedemnaście",
    "osiemnaście",
    "dziewiętnaście",
];

const TENS: [&str; 8] = [
    "dwadzieścia",
    "trzydzieści",
    "czterdzieści",
    "pięćdziesiąt",
    "sześćdziesiąt",
    "siedemdziesiąt",
    "osiemdziesiąt",
    "dziewięćdziesiąt",
];

const HUNDREDS: [&str; 9] = [
    "sto", "dwieście", "trzysta", "czterysta", "pięćset", "sześćset", "siedemset", "osiemset",
    "dziewięćset",
];

/// (singular, paucal 2-4, plural 5+) forms of each magnitude group
const GROUPS: [(&str, &str, &str); 3] = [
    ("tysiąc", "tysiące", "tysięcy"),
    ("milion", "miliony", "milionów"),
    ("miliard", "miliardy", "miliardów"),
];

/// Selects the Polish plural form for a cardinal count
fn plural_form(count: u64, (one, few, many): (&'static str, &'static str, &'static str)) -> &'static str {
    if count == 1 {
        return one;
    }
    let last_two = count % 100;
    let last = count % 10;
    if (2..=4).contains(&last) && !(12..=14).contains(&last_two) {
        few
    } else {
        many
    }
}

/// Renders a number below one thousand
fn under_thousand(n: u64) -> String {
    debug_assert!(n < 1000);
    let mut parts: Vec<&str> = Vec::with_capacity(3);

    let hundreds = (n / 100) as usize;
    if hundreds > 0 {
        parts.push(HUNDREDS[hundreds - 1]);
    }

    let rest = n % 100;
    if (10..=19).contains(&rest) {
        parts.push(TEENS[(rest - 10) as usize]);
    } else {
        let tens = (rest / 10) as usize;
        if tens >= 2 {
            parts.push(TENS[tens - 2]);
        }
        let ones = (rest % 10) as usize;
        if ones > 0 {
            parts.push(ONES[ones]);
        }
    }

    parts.join(" ")
}

/// Renders a non-negative integer as Polish cardinal words
///
/// Recursion peels the highest thousand-group first: the group count is
/// rendered with [`under_thousand`] (omitting a bare "jeden" before the
/// group name, so 1000 is "tysiąc", not "jeden tysiąc") and the remainder
/// recurses.
pub fn integer_to_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }
    to_words_nonzero(n)
}

fn to_words_nonzero(n: u64) -> String {
    // Find the highest applicable group: 10^3, 10^6, 10^9
    for (index, &group) in GROUPS.iter().enumerate().rev() {
        let magnitude = 10u64.pow(3 * (index as u32 + 1));
        if n >= magnitude {
            let count = n / magnitude;
            let remainder = n % magnitude;

            let mut rendered = String::new();
            if count > 1 {
                rendered.push_str(&to_words_nonzero(count));
                rendered.push(' ');
            }
            rendered.push_str(plural_form(count, group));

            if remainder > 0 {
                rendered.push(' ');
                rendered.push_str(&to_words_nonzero(remainder));
            }
            return rendered;
        }
    }
    under_thousand(n)
}

/// Renders a monetary amount in words, with the minor part as `NN/100`
///
/// The integer part of the rounded amount is spelled out and followed by
/// the currency's declined major-unit name; the fraction is always rendered
/// as two digits over 100 with the genitive-plural minor-unit name.
pub fn amount_in_words(amount: &Money) -> String {
    let (major, minor) = amount.split_units();
    format!(
        "{} {} {:02}/100 {}",
        integer_to_words(major),
        amount.currency().major_unit_name(major),
        minor,
        amount.currency().minor_unit_name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn zero() {
        assert_eq!(integer_to_words(0), "zero");
    }

    #[test]
    fn single_digits() {
        assert_eq!(integer_to_words(1), "jeden");
        assert_eq!(integer_to_words(7), "siedem");
    }

    #[test]
    fn teens() {
        assert_eq!(integer_to_words(11), "jedenaście");
        assert_eq!(integer_to_words(19), "dziewiętnaście");
    }

    #[test]
    fn tens_with_ones() {
        assert_eq!(integer_to_words(42), "czterdzieści dwa");
        assert_eq!(integer_to_words(90), "dziewięćdziesiąt");
    }

    #[test]
    fn hundreds() {
        assert_eq!(integer_to_words(100), "sto");
        assert_eq!(integer_to_words(123), "sto dwadzieścia trzy");
        assert_eq!(integer_to_words(999), "dziewięćset dziewięćdziesiąt dziewięć");
    }

    #[test]
    fn bare_thousand_omits_jeden() {
        assert_eq!(integer_to_words(1000), "tysiąc");
        assert_eq!(integer_to_words(1230), "tysiąc dwieście trzydzieści");
    }

    #[test]
    fn thousand_groups_pluralize() {
        assert_eq!(integer_to_words(2000), "dwa tysiące");
        assert_eq!(integer_to_words(5000), "pięć tysięcy");
        assert_eq!(integer_to_words(12000), "dwanaście tysięcy");
        assert_eq!(integer_to_words(22000), "dwadzieścia dwa tysiące");
    }

    #[test]
    fn millions_and_billions() {
        assert_eq!(integer_to_words(1_000_000), "milion");
        assert_eq!(
            integer_to_words(2_000_001),
            "dwa miliony jeden"
        );
        assert_eq!(
            integer_to_words(1_002_003_004),
            "miliard dwa miliony trzy tysiące cztery"
        );
    }

    #[test]
    fn fractional_amount_in_zlote() {
        let gross = Money::new(dec!(123.68), Currency::PLN);
        assert_eq!(
            amount_in_words(&gross),
            "sto dwadzieścia trzy złote 68/100 groszy"
        );
    }

    #[test]
    fn round_thousand_in_zlotych() {
        let gross = Money::new(dec!(1230.00), Currency::PLN);
        assert_eq!(
            amount_in_words(&gross),
            "tysiąc dwieście trzydzieści złotych 00/100 groszy"
        );
    }

    #[test]
    fn one_zloty_is_singular() {
        let gross = Money::new(dec!(1.01), Currency::PLN);
        assert_eq!(amount_in_words(&gross), "jeden złoty 01/100 groszy");
    }

    #[test]
    fn foreign_currency_units() {
        let gross = Money::new(dec!(100.00), Currency::EUR);
        assert_eq!(amount_in_words(&gross), "sto euro 00/100 centów");
    }

    #[test]
    fn zero_amount() {
        let gross = Money::zero(Currency::PLN);
        assert_eq!(amount_in_words(&gross), "zero złotych 00/100 groszy");
    }

    #[test]
    fn deterministic_across_calls() {
        let gross = Money::new(dec!(2583.00), Currency::PLN);
        let first = amount_in_words(&gross);
        let second = amount_in_words(&gross);
        assert_eq!(first, second);
        assert_eq!(
            first,
            "dwa tysiące pięćset osiemdziesiąt trzy złote 00/100 groszy"
        );
    }
}
