/// First character upper-cased, the rest lower-cased ("sOY sauce" -> "Soy sauce")
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("flour"), "Flour");
        assert_eq!(capitalize("sOY SAUCE"), "Soy sauce");
        assert_eq!(capitalize("яйцо"), "Яйцо");
        assert_eq!(capitalize(""), "");
    }
}
