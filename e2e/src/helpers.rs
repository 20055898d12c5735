use depot_common::Gold;
use log::*;

/// Parses an amount written in a scenario, e.g. `50`, `12.5` or `12.50g`.
pub fn parse_gold(s: &str) -> Gold {
    let s = s.trim().trim_end_matches('g');
    let value = s.parse::<f64>().unwrap_or_else(|e| panic!("'{s}' is not an amount of gold. {e}"));
    Gold::try_from_f64(value).unwrap_or_else(|e| panic!("'{s}' cannot be held as gold. {e}"))
}

/// Parses a comma separated list of names, e.g. `Alice, Bob`. Surrounding quotes and blanks are dropped.
pub fn parse_names(s: &str) -> Vec<String> {
    let names = s
        .split(',')
        .map(|n| n.trim().trim_matches('"').to_string())
        .filter(|n| !n.is_empty())
        .collect::<Vec<String>>();
    trace!("Parsed names: {names:?}");
    names
}

/// The stable id the scenarios assign to a player.
pub fn stable_id_for(name: &str) -> String {
    format!("uuid-{}", name.to_lowercase())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gold_amounts() {
        assert_eq!(parse_gold("50"), Gold::from_gold(50));
        assert_eq!(parse_gold(" 12.5 "), Gold::from(1250));
        assert_eq!(parse_gold("12.50g"), Gold::from(1250));
        assert_eq!(parse_gold("-3"), Gold::from_gold(-3));
    }

    #[test]
    #[should_panic]
    fn not_gold() {
        parse_gold("lots");
    }

    #[test]
    fn names() {
        assert_eq!(parse_names("Alice, Bob"), vec!["Alice".to_string(), "Bob".to_string()]);
        assert_eq!(parse_names("\"Carol\""), vec!["Carol".to_string()]);
        assert!(parse_names(" , ").is_empty());
    }

    #[test]
    fn stable_ids() {
        assert_eq!(stable_id_for("Alice"), "uuid-alice");
    }
}
