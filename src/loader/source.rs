//! Where stimulus files come from

use std::path::PathBuf;

use crate::loader::LoadError;

/// Base location of the stimulus files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StimulusLocation {
    Directory(PathBuf),
    /// http(s) base URL, without trailing slash
    Remote(String),
}

impl StimulusLocation {
    /// Anything starting with `http://` or `https://` is remote
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            StimulusLocation::Remote(raw.trim_end_matches('/').to_string())
        } else {
            StimulusLocation::Directory(PathBuf::from(raw))
        }
    }

    pub fn resolve(&self, filename: &str) -> StimulusSource {
        match self {
            StimulusLocation::Directory(dir) => StimulusSource::File(dir.join(filename)),
            StimulusLocation::Remote(base) => {
                StimulusSource::Url(format!("{}/{}", base, filename.trim_start_matches('/')))
            }
        }
    }
}

/// A single stimulus file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StimulusSource {
    File(PathBuf),
    Url(String),
}

impl StimulusSource {
    /// Read the file's text
    pub async fn fetch(&self, client: &reqwest::Client) -> Result<String, LoadError> {
        match self {
            StimulusSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| LoadError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            }
            StimulusSource::Url(url) => {
                let response = client.get(url).send().await.map_err(|source| LoadError::Http {
                    url: url.clone(),
                    source,
                })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }

                response.text().await.map_err(|source| LoadError::Http {
                    url: url.clone(),
                    source,
                })
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StimulusSource::File(path) => path.display().to_string(),
            StimulusSource::Url(url) => url.clone(),
        }
    }
}
