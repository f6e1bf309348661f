//! Brazilian Portuguese cardinal numerals ("por extenso").

use crate::error::{DocumentError, Result};

const UNITS: [&str; 10] = [
    "zero", "um", "dois", "três", "quatro", "cinco", "seis", "sete", "oito", "nove",
];

const TEENS: [&str; 10] = [
    "dez",
    "onze",
    "doze",
    "treze",
    "quatorze",
    "quinze",
    "dezesseis",
    "dezessete",
    "dezoito",
    "dezenove",
];

const TENS: [&str; 10] = [
    "", "", "vinte", "trinta", "quarenta", "cinquenta", "sessenta", "setenta", "oitenta", "noventa",
];

const HUNDREDS: [&str; 10] = [
    "",
    "cento",
    "duzentos",
    "trezentos",
    "quatrocentos",
    "quinhentos",
    "seiscentos",
    "setecentos",
    "oitocentos",
    "novecentos",
];

/// Largest value [`spell_number`] accepts.
pub const MAX_SPELLABLE: u64 = 999_999_999_999;

/// Spells `n` in words, e.g. `1234` -> `"mil duzentos e trinta e quatro"`.
///
/// Groups are joined with `" e "` when the remainder below the group is
/// under one hundred or a whole number of hundreds ("dois mil e quinhentos"),
/// and with a plain space otherwise ("mil duzentos e trinta e quatro").
pub fn spell_number(n: u64) -> Result<String> {
    if n > MAX_SPELLABLE {
        return Err(DocumentError::NumberOutOfRange(n));
    }
    Ok(spell(n))
}

/// Same as [`spell_number`] with a `"menos "` prefix for negative values.
pub fn spell_signed(n: i64) -> Result<String> {
    let words = spell_number(n.unsigned_abs())?;
    if n < 0 {
        Ok(format!("menos {}", words))
    } else {
        Ok(words)
    }
}

fn spell(n: u64) -> String {
    match n {
        0..=9 => UNITS[n as usize].to_string(),
        10..=19 => TEENS[(n - 10) as usize].to_string(),
        20..=99 => {
            let tens = TENS[(n / 10) as usize];
            match n % 10 {
                0 => tens.to_string(),
                unit => format!("{} e {}", tens, UNITS[unit as usize]),
            }
        }
        100 => "cem".to_string(),
        101..=999 => {
            let hundreds = HUNDREDS[(n / 100) as usize];
            match n % 100 {
                0 => hundreds.to_string(),
                rest => format!("{} e {}", hundreds, spell(rest)),
            }
        }
        1_000..=999_999 => {
            let thousands = n / 1_000;
            let head = if thousands == 1 {
                "mil".to_string()
            } else {
                format!("{} mil", spell(thousands))
            };
            join_group(head, n % 1_000)
        }
        1_000_000..=999_999_999 => {
            join_group(scaled(n / 1_000_000, "milhão", "milhões"), n % 1_000_000)
        }
        _ => join_group(
            scaled(n / 1_000_000_000, "bilhão", "bilhões"),
            n % 1_000_000_000,
        ),
    }
}

fn scaled(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("um {}", singular)
    } else {
        format!("{} {}", spell(count), plural)
    }
}

fn join_group(head: String, rest: u64) -> String {
    if rest == 0 {
        head
    } else if rest < 100 || rest % 100 == 0 {
        format!("{} e {}", head, spell(rest))
    } else {
        format!("{} {}", head, spell(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: u64) -> String {
        spell_number(n).unwrap()
    }

    #[test]
    fn test_units_and_teens() {
        assert_eq!(words(0), "zero");
        assert_eq!(words(1), "um");
        assert_eq!(words(3), "três");
        assert_eq!(words(10), "dez");
        assert_eq!(words(14), "quatorze");
        assert_eq!(words(15), "quinze");
        assert_eq!(words(19), "dezenove");
    }

    #[test]
    fn test_tens() {
        assert_eq!(words(20), "vinte");
        assert_eq!(words(21), "vinte e um");
        assert_eq!(words(56), "cinquenta e seis");
        assert_eq!(words(99), "noventa e nove");
    }

    #[test]
    fn test_cem_versus_cento() {
        assert_eq!(words(100), "cem");
        assert_eq!(words(101), "cento e um");
        assert_eq!(words(110), "cento e dez");
        assert_eq!(words(200), "duzentos");
        assert_eq!(words(234), "duzentos e trinta e quatro");
        assert_eq!(words(999), "novecentos e noventa e nove");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(words(1_000), "mil");
        assert_eq!(words(2_000), "dois mil");
        assert_eq!(words(1_001), "mil e um");
        assert_eq!(words(1_100), "mil e cem");
        assert_eq!(words(2_500), "dois mil e quinhentos");
        assert_eq!(words(1_234), "mil duzentos e trinta e quatro");
        assert_eq!(words(100_000), "cem mil");
        assert_eq!(words(101_000), "cento e um mil");
        assert_eq!(
            words(999_999),
            "novecentos e noventa e nove mil novecentos e noventa e nove"
        );
    }

    #[test]
    fn test_millions_agree_in_number() {
        assert_eq!(words(1_000_000), "um milhão");
        assert_eq!(words(2_000_000), "dois milhões");
        assert_eq!(words(1_000_100), "um milhão e cem");
        assert_eq!(words(1_200_000), "um milhão e duzentos mil");
        assert_eq!(
            words(3_450_123),
            "três milhões quatrocentos e cinquenta mil cento e vinte e três"
        );
        assert_eq!(
            words(999_999_999),
            "novecentos e noventa e nove milhões novecentos e noventa e nove mil novecentos e noventa e nove"
        );
    }

    #[test]
    fn test_billions() {
        assert_eq!(words(1_000_000_000), "um bilhão");
        assert_eq!(words(2_000_000_005), "dois bilhões e cinco");
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            spell_number(MAX_SPELLABLE + 1),
            Err(DocumentError::NumberOutOfRange(_))
        ));
    }

    #[test]
    fn test_negative() {
        assert_eq!(spell_signed(-21).unwrap(), "menos vinte e um");
        assert_eq!(spell_signed(7).unwrap(), "sete");
    }
}
