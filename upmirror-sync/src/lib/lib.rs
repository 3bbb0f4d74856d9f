use futures::{future, Future};

pub mod classify;
pub mod oauth2;
pub mod observe;
pub mod replicate;
pub mod snapshot;
pub mod storage;
pub mod upload;

pub use crate::observe::{Event, Observer};
pub use crate::replicate::{Policy, Replicator, Summary};
pub use crate::snapshot::Snapshot;

pub mod uri {
    /// Decoded parameters of a URL query string
    #[derive(Debug, Default)]
    pub struct QueryMap(Vec<(String, String)>);

    impl QueryMap {
        pub fn parse(query: Option<&str>) -> QueryMap {
            let vec = query
                .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
                .unwrap_or_default();
            QueryMap(vec)
        }

        pub fn get(&self, key: &str) -> Option<&str> {
            self.0
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        }
    }

    #[test]
    fn test_query_map() {
        let q = QueryMap::parse(Some("state=abc&code=4%2F0Ad&scope=drive"));
        assert_eq!(q.get("code"), Some("4/0Ad"));
        assert_eq!(q.get("state"), Some("abc"));
        assert_eq!(q.get("error"), None);
        assert_eq!(QueryMap::parse(None).get("code"), None);
    }
}

pub(crate) mod error {
    use std::fmt;

    pub fn api<E: fmt::Display>(err: E) -> upmirror::Error {
        upmirror::Error::Api(err.to_string())
    }

    pub fn auth<E: fmt::Display>(err: E) -> upmirror::Error {
        upmirror::Error::Auth(err.to_string())
    }
}

/// Saving of cached state (e.g. OAuth2 tokens) before the program exits
pub trait PersistCache {
    fn persist_cache(&self) -> impl Future<Output = anyhow::Result<()>> + Send {
        future::ready(Ok(()))
    }
}
