/// Strips marker tokens ("copy", "_v1", "backup", ...) from file names before
/// version comparison. Matching is case-sensitive and tokens are removed in
/// the order they were configured.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    tokens: Vec<String>,
}

impl Normalizer {
    pub fn new(tokens: Vec<String>) -> Self {
        let tokens = tokens.into_iter().filter(|t| !t.is_empty()).collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn normalize(&self, file_name: &str) -> String {
        self.tokens
            .iter()
            .fold(file_name.to_string(), |name, token| name.replace(token.as_str(), ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer(tokens: &[&str]) -> Normalizer {
        Normalizer::new(tokens.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn test_removes_every_occurrence() {
        let n = normalizer(&["_copy"]);
        assert_eq!(n.normalize("a_copy_copy.txt"), "a.txt");
    }

    #[test]
    fn test_case_sensitive() {
        let n = normalizer(&["copy"]);
        assert_eq!(n.normalize("Copy of notes.txt"), "Copy of notes.txt");
        assert_eq!(n.normalize("notes copy.txt"), "notes .txt");
    }

    #[test]
    fn test_tokens_applied_in_order() {
        // Removing "v1" first leaves "_" behind, so "_v1" never matches.
        let n = normalizer(&["v1", "_v1"]);
        assert_eq!(n.normalize("report_v1.txt"), "report_.txt");
    }

    #[test]
    fn test_no_tokens_is_identity() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("report_v1.txt"), "report_v1.txt");
    }

    #[test]
    fn test_empty_tokens_dropped() {
        let n = normalizer(&["", "_v1"]);
        assert_eq!(n.tokens().len(), 1);
    }
}
