use std::sync::OnceLock;

use regex::Regex;

use crate::types::ExtractedListing;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_brand, r"(?i)samsung|xiaomi|infinix|vivo|oppo");
re!(re_model_family, r"(?i)galaxy|note|redmi");
// Alphanumeric model codes: one or more letters immediately followed by digits
// ("A14", "SM-A145F" via "A145").
re!(re_model_code, r"[A-Za-z]+\d+");
// Currency-prefixed amount: 2–3 letter abbreviation, optional dot, digits
// ("Rs. 24999", "PKR 24999", "USD 299").
re!(re_currency, r"(?i)\b[a-z]{2,3}\.?\s*\d+");
// Bare price fallback. Known to false-positive on phone numbers, serials and
// dates; kept as-is because the listing photos it was tuned on rarely carry
// any other long digit run.
re!(re_digit_run, r"\d{4,}");
re!(re_ram, r"(?i)\d+\s*gb\s*ram");
// Storage with an explicit suffix, and the bare-capacity fallback. The
// fallback can land on the same line as ram or price.
re!(re_storage_labeled, r"(?i)\d+\s*gb\s*(rom|storage)");
re!(re_storage_bare, r"(?i)\d+\s*gb");

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Extract listing fields from raw OCR text.
    ///
    /// Scans the trimmed lines once per field and keeps the first line (in
    /// input order) matching that field's rule. Absence is the normal result
    /// for any field; this never fails.
    pub fn extract(ocr_text: &str) -> ExtractedListing {
        let lines: Vec<&str> = ocr_text.lines().map(str::trim).collect();

        ExtractedListing {
            brand: first_match(&lines, |l| re_brand().is_match(l)),
            model: first_match(&lines, |l| {
                re_model_family().is_match(l) || re_model_code().is_match(l)
            }),
            price: Self::extract_price(&lines),
            ram: first_match(&lines, |l| re_ram().is_match(l)),
            storage: Self::extract_storage(&lines),
        }
    }

    /// A currency-prefixed line anywhere in the text beats the digit-run
    /// fallback, so "Rs. 999" on line 5 wins over a serial number on line 2.
    fn extract_price(lines: &[&str]) -> Option<String> {
        first_match(lines, |l| re_currency().is_match(l))
            .or_else(|| first_match(lines, |l| re_digit_run().is_match(l)))
    }

    /// A line carrying an explicit ROM/Storage suffix beats a bare capacity
    /// like "8GB", which would otherwise pick up the RAM line.
    fn extract_storage(lines: &[&str]) -> Option<String> {
        first_match(lines, |l| re_storage_labeled().is_match(l))
            .or_else(|| first_match(lines, |l| re_storage_bare().is_match(l)))
    }
}

fn first_match(lines: &[&str], pred: impl Fn(&str) -> bool) -> Option<String> {
    lines.iter().find(|l| pred(l)).map(|l| (*l).to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samsung_listing_fills_every_field() {
        let text = "Samsung Galaxy A14\nRs. 24999\n8GB RAM\n128GB Storage";
        let r = Extractor::extract(text);
        assert_eq!(r.brand.as_deref(), Some("Samsung Galaxy A14"));
        assert_eq!(r.model.as_deref(), Some("Samsung Galaxy A14"));
        assert_eq!(r.price.as_deref(), Some("Rs. 24999"));
        assert_eq!(r.ram.as_deref(), Some("8GB RAM"));
        assert_eq!(r.storage.as_deref(), Some("128GB Storage"));
    }

    #[test]
    fn unrecognizable_text_yields_all_absent() {
        let r = Extractor::extract("hello world");
        assert!(r.is_empty());
    }

    #[test]
    fn empty_input_yields_all_absent() {
        assert!(Extractor::extract("").is_empty());
    }

    #[test]
    fn first_matching_line_wins_per_field() {
        let text = "Xiaomi Store\nSamsung Galaxy S23";
        let r = Extractor::extract(text);
        assert_eq!(r.brand.as_deref(), Some("Xiaomi Store"));
        // Model rule matches the Galaxy line first — fields scan independently.
        assert_eq!(r.model.as_deref(), Some("Samsung Galaxy S23"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "Oppo A57\nPKR 32,999\n6GB RAM\n128 GB ROM";
        assert_eq!(Extractor::extract(text), Extractor::extract(text));
    }

    #[test]
    fn values_are_trimmed_input_lines() {
        let text = "   Vivo Y27   \n  Rs. 41999  ";
        let r = Extractor::extract(text);
        assert_eq!(r.brand.as_deref(), Some("Vivo Y27"));
        assert_eq!(r.price.as_deref(), Some("Rs. 41999"));
    }

    #[test]
    fn model_code_without_family_keyword() {
        let r = Extractor::extract("Infinix\nX6525 Smart 8");
        assert_eq!(r.brand.as_deref(), Some("Infinix"));
        assert_eq!(r.model.as_deref(), Some("X6525 Smart 8"));
    }

    #[test]
    fn currency_line_preferred_over_digit_run_fallback() {
        // The serial number comes first but the currency-prefixed line wins.
        let text = "Serial: 123456789\nRs 24999";
        let r = Extractor::extract(text);
        assert_eq!(r.price.as_deref(), Some("Rs 24999"));
    }

    #[test]
    fn digit_run_fallback_when_no_currency_prefix() {
        let r = Extractor::extract("Galaxy Tab\n24999");
        assert_eq!(r.price.as_deref(), Some("24999"));
    }

    #[test]
    fn short_digit_runs_do_not_trigger_fallback() {
        let r = Extractor::extract("room 101\nfloor 3");
        assert_eq!(r.price, None);
    }

    #[test]
    fn ram_requires_the_ram_suffix() {
        let r = Extractor::extract("256GB Storage");
        assert_eq!(r.ram, None);
        assert_eq!(r.storage.as_deref(), Some("256GB Storage"));
    }

    #[test]
    fn ram_whitespace_is_flexible() {
        let r = Extractor::extract("8 GB  RAM");
        assert_eq!(r.ram.as_deref(), Some("8 GB  RAM"));
    }

    #[test]
    fn storage_suffix_is_optional() {
        // The loosest rule: a bare capacity matches storage too.
        let r = Extractor::extract("64GB");
        assert_eq!(r.storage.as_deref(), Some("64GB"));
    }

    #[test]
    fn labeled_storage_beats_bare_capacity() {
        let r = Extractor::extract("8GB RAM\n128GB ROM");
        assert_eq!(r.ram.as_deref(), Some("8GB RAM"));
        assert_eq!(r.storage.as_deref(), Some("128GB ROM"));
    }

    #[test]
    fn storage_fallback_can_share_a_line_with_ram() {
        // With no suffixed line anywhere, the bare-capacity fallback lands on
        // the RAM line.
        let r = Extractor::extract("Redmi 12\n8GB RAM");
        assert_eq!(r.ram.as_deref(), Some("8GB RAM"));
        assert_eq!(r.storage.as_deref(), Some("8GB RAM"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let r = Extractor::extract("SAMSUNG galaxy a54\nrs. 115999\n8gb ram");
        assert_eq!(r.brand.as_deref(), Some("SAMSUNG galaxy a54"));
        assert_eq!(r.model.as_deref(), Some("SAMSUNG galaxy a54"));
        assert_eq!(r.price.as_deref(), Some("rs. 115999"));
        assert_eq!(r.ram.as_deref(), Some("8gb ram"));
    }

    #[test]
    fn no_panic_on_garbage_input() {
        let _ = Extractor::extract("!@#$%^&*()\n\0\x01\x02");
        let _ = Extractor::extract("\n\n\n");
    }
}
