/// Exact, byte-for-byte comparison. Any trimming already happened during extraction.
pub fn is_correct(answer: &str, target: &str) -> bool {
	answer == target
}
