use std::collections::HashMap;
use std::fmt;

/// Backend options, consumed once when a storage is dialed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opts {
    pub opts: HashMap<String, String>,
}

impl Opts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.opts.get(key)
    }

    /// 解析 `key=value` 形式的設定行，例如 `spacesRegion=nyc3`
    pub fn from_lines<I, S>(lines: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::new();
        for line in lines {
            let (key, value) = line.as_ref().split_once('=')?;
            opts.opts.insert(key.trim().to_string(), value.trim().to_string());
        }
        Some(opts)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Opts {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            opts: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Access key pair for the object store. Either half may be missing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: Some(access_key.into()),
            secret_key: Some(secret_key.into()),
        }
    }
}

// 不在日誌中輸出金鑰
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key.as_ref().map(|_| "***"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .finish()
    }
}
