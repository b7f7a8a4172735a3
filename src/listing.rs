use serde::Deserialize;

/// Query parameters shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub search: Option<String>,
}

fn default_limit() -> i64 {
    10
}

impl ListParams {
    /// Clamps skip/limit into sane bounds before they hit a query.
    pub fn clamped(&self) -> (i64, i64) {
        let skip = self.skip.max(0);
        let limit = self.limit.clamp(1, 100);
        (skip, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_params_missing() {
        let p: ListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p.skip, 0);
        assert_eq!(p.limit, 10);
        assert!(p.search.is_none());
    }

    #[test]
    fn clamped_bounds_skip_and_limit() {
        let p = ListParams {
            skip: -5,
            limit: 1000,
            search: None,
        };
        assert_eq!(p.clamped(), (0, 100));

        let p = ListParams {
            skip: 3,
            limit: 0,
            search: None,
        };
        assert_eq!(p.clamped(), (3, 1));
    }
}
