/// Builds the web UI link for a repository.
///
/// Points at the last pipeline when there is one, otherwise at the
/// repository page.
///
/// # Arguments
///
/// * `base_url` - Woodpecker server URL without trailing slash (e.g., <https://ci.example.com>)
/// * `repo_id` - Numeric repository ID
/// * `pipeline_number` - Number of the last pipeline, if the repository ever built
///
/// # Returns
///
/// Clickable URL (e.g., <https://ci.example.com/repos/7/pipeline/41>)
pub fn repo_link(base_url: &str, repo_id: i64, pipeline_number: Option<i64>) -> String {
    match pipeline_number {
        Some(number) => pipeline_url(base_url, repo_id, number),
        None => format!("{base_url}/repos/{repo_id}"),
    }
}

fn pipeline_url(base_url: &str, repo_id: i64, number: i64) -> String {
    format!("{base_url}/repos/{repo_id}/pipeline/{number}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_link_with_pipeline() {
        let url = repo_link("https://ci.example.com", 7, Some(41));
        assert_eq!(url, "https://ci.example.com/repos/7/pipeline/41");
    }

    #[test]
    fn test_repo_link_without_pipeline() {
        let url = repo_link("https://ci.example.com", 7, None);
        assert_eq!(url, "https://ci.example.com/repos/7");
    }

    #[test]
    fn test_repo_link_with_path_prefix() {
        let url = repo_link("https://example.com/woodpecker", 3, Some(0));
        assert_eq!(url, "https://example.com/woodpecker/repos/3/pipeline/0");
    }
}
