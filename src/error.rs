use std::fmt;
use std::io;

pub(crate) type BundleResult<T> = Result<T, Error>;

/// The two kinds of assets a bundle can ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Language,
    Theme,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Language => f.write_str("Language"),
            AssetKind::Theme => f.write_str("Theme"),
        }
    }
}

/// Errors that can occur when building or using a bundled highlighter
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred when reading a grammar or theme file
    /// or a dump file if the `dump` feature is enabled
    Io(io::Error),

    /// JSON parsing failed when loading a grammar or a theme.
    Json(serde_json::Error),

    /// A language or theme id was requested that the bundle does not contain.
    /// Raised before the engine is ever touched.
    #[allow(missing_docs)]
    NotBundled { kind: AssetKind, id: String },

    /// The engine failed while being created, loading an asset or rendering.
    /// The engine error is kept as is and can be downcast.
    Engine(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    pub(crate) fn not_bundled(kind: AssetKind, id: &str) -> Self {
        Error::NotBundled {
            kind,
            id: id.to_owned(),
        }
    }

    pub(crate) fn engine<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Engine(Box::new(err))
    }

    /// Returns the engine error if this is one and it has the given type
    pub fn engine_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Engine(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Json(err) => write!(f, "JSON parsing error: {}", err),
            Error::NotBundled { kind, id } => write!(
                f,
                "{} `{}` is not included in this bundle. You may want to load it from an external source.",
                kind, id
            ),
            Error::Engine(err) => write!(f, "engine error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Engine(err) => {
                let err: &(dyn std::error::Error + 'static) = &**err;
                Some(err)
            }
            Error::NotBundled { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
