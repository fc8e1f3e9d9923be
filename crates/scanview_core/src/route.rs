use crate::JobHash;

const JOB_PREFIX: &str = "/query/";

/// Client-side location: either the query composer or a job's results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Compose,
    Job(JobHash),
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.trim();
        if path.is_empty() || path == "/" {
            return Some(Route::Compose);
        }
        let hash = path.strip_prefix(JOB_PREFIX)?.trim_end_matches('/');
        if hash.is_empty() || hash.contains('/') {
            return None;
        }
        Some(Route::Job(JobHash::new(hash)))
    }

    pub fn path(&self) -> String {
        match self {
            Route::Compose => "/".to_string(),
            Route::Job(hash) => format!("{JOB_PREFIX}{hash}"),
        }
    }

    pub fn job_hash(&self) -> Option<&JobHash> {
        match self {
            Route::Compose => None,
            Route::Job(hash) => Some(hash),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Route;
    use crate::JobHash;

    #[test]
    fn parses_compose_and_job_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Compose));
        assert_eq!(Route::parse(""), Some(Route::Compose));
        assert_eq!(
            Route::parse("/query/abc123"),
            Some(Route::Job(JobHash::new("abc123")))
        );
        assert_eq!(
            Route::parse("/query/abc123/"),
            Some(Route::Job(JobHash::new("abc123")))
        );
    }

    #[test]
    fn rejects_unknown_paths() {
        assert_eq!(Route::parse("/query/"), None);
        assert_eq!(Route::parse("/query/a/b"), None);
        assert_eq!(Route::parse("/status"), None);
    }

    #[test]
    fn path_is_inverse_of_parse() {
        let route = Route::Job(JobHash::new("xyz789"));
        assert_eq!(route.path(), "/query/xyz789");
        assert_eq!(Route::parse(&route.path()), Some(route));
        assert_eq!(Route::Compose.path(), "/");
    }
}
