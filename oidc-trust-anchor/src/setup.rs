use std::{
    fs::{DirBuilder, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{info, warn};
use url::Url;

use crate::{
    discovery::{DiscoveryDocument, JWKS_URI_PLACEHOLDER},
    error::{EncodeError, SetupError, StartupError},
    jwks::write_jwks,
    keypair::{
        write_private_key, write_public_key, KeyGenerator, DEFAULT_KEY_BITS, MAX_KEY_BITS,
        MIN_KEY_BITS,
    },
};

pub const DEFAULT_OUTPUT_DIR: &str = "irsa";
pub const DEFAULT_JWKS_FILE_NAME: &str = "jwks.json";
pub const DEFAULT_DISCOVERY_FILE_NAME: &str = "discovery.json";
pub const DEFAULT_PUBLIC_KEY_FILE_NAME: &str = "signer.pub";
pub const DEFAULT_PRIVATE_KEY_FILE_NAME: &str = "signer.key";

const DIRECTORY_MODE: u32 = 0o700;
const PUBLIC_FILE_MODE: u32 = 0o644;
const PRIVATE_FILE_MODE: u32 = 0o600;

#[derive(Clone, Debug, PartialEq)]
pub struct ArtifactFileNames {
    pub jwks: String,
    pub discovery: String,
    pub public_key: String,
    pub private_key: String,
}

impl Default for ArtifactFileNames {
    fn default() -> Self {
        ArtifactFileNames {
            jwks: DEFAULT_JWKS_FILE_NAME.to_owned(),
            discovery: DEFAULT_DISCOVERY_FILE_NAME.to_owned(),
            public_key: DEFAULT_PUBLIC_KEY_FILE_NAME.to_owned(),
            private_key: DEFAULT_PRIVATE_KEY_FILE_NAME.to_owned(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SetupConfiguration {
    pub output_dir: PathBuf,
    pub issuer: String,
    pub authorization_endpoint: Option<String>,
    pub key_bits: usize,
    pub file_names: ArtifactFileNames,
}

impl SetupConfiguration {
    pub fn builder() -> SetupConfigurationBuilder {
        SetupConfigurationBuilder::new()
    }
}

pub struct SetupConfigurationBuilder {
    output_dir: Option<PathBuf>,
    issuer: Option<String>,
    allow_placeholder_issuer: bool,
    authorization_endpoint: Option<String>,
    key_bits: Option<usize>,
    file_names: ArtifactFileNames,
}

impl SetupConfigurationBuilder {
    fn new() -> Self {
        SetupConfigurationBuilder {
            output_dir: None,
            issuer: None,
            allow_placeholder_issuer: false,
            authorization_endpoint: None,
            key_bits: None,
            file_names: ArtifactFileNames::default(),
        }
    }

    /// Set the directory all artifacts are written to.
    ///
    /// Created (including parents) if missing.
    /// Default value is `irsa`, relative to the working directory.
    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    /// Set the issuer the discovery document is published for.
    ///
    /// Must be an `https` URL without credentials, query, fragment or
    /// trailing slash, since `jwks_uri` is derived by appending `/jwks.json`
    /// to it.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Allow building without an issuer.
    ///
    /// The discovery document then carries an empty `issuer` and the
    /// placeholder `jwks_uri`, and has to be rewritten before it is published.
    pub fn allow_placeholder_issuer(mut self, allow: bool) -> Self {
        self.allow_placeholder_issuer = allow;
        self
    }

    pub fn authorization_endpoint(mut self, authorization_endpoint: impl Into<String>) -> Self {
        self.authorization_endpoint = Some(authorization_endpoint.into());
        self
    }

    /// Set the modulus size of the generated key.
    ///
    /// Must be between 2048 and 4096. Default value is 2048.
    pub fn key_bits(mut self, key_bits: usize) -> Self {
        self.key_bits = Some(key_bits);
        self
    }

    pub fn jwks_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_names.jwks = name.into();
        self
    }

    pub fn discovery_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_names.discovery = name.into();
        self
    }

    pub fn public_key_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_names.public_key = name.into();
        self
    }

    pub fn private_key_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_names.private_key = name.into();
        self
    }

    /// Construct a SetupConfiguration.
    pub fn build(self) -> Result<SetupConfiguration, StartupError> {
        let issuer = match self.issuer {
            Some(issuer) if !issuer.is_empty() => {
                validate_issuer(&issuer)?;
                issuer
            }
            _ if self.allow_placeholder_issuer => String::new(),
            _ => {
                return Err(StartupError::InvalidParameter(
                    "issuer is required".to_owned(),
                ))
            }
        };

        let key_bits = self.key_bits.unwrap_or(DEFAULT_KEY_BITS);
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&key_bits) {
            return Err(StartupError::InvalidParameter(format!(
                "key_bits must be between {} and {}",
                MIN_KEY_BITS, MAX_KEY_BITS
            )));
        }

        for name in [
            &self.file_names.jwks,
            &self.file_names.discovery,
            &self.file_names.public_key,
            &self.file_names.private_key,
        ] {
            validate_file_name(name)?;
        }

        Ok(SetupConfiguration {
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            issuer,
            authorization_endpoint: self.authorization_endpoint,
            key_bits,
            file_names: self.file_names,
        })
    }
}

impl Default for SetupConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_issuer(issuer: &str) -> Result<(), StartupError> {
    let url = Url::parse(issuer)
        .map_err(|_| StartupError::InvalidParameter("Invalid issuer format".to_owned()))?;
    if url.scheme() != "https" {
        return Err(StartupError::InvalidParameter(
            "issuer must use the https scheme".to_owned(),
        ));
    }
    if !url.has_host() {
        return Err(StartupError::InvalidParameter(
            "issuer must contain a host".to_owned(),
        ));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(StartupError::InvalidParameter(
            "issuer must not contain credentials".to_owned(),
        ));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(StartupError::InvalidParameter(
            "issuer must not contain a query or fragment".to_owned(),
        ));
    }
    if issuer.ends_with('/') {
        return Err(StartupError::InvalidParameter(
            "issuer must not end with a slash".to_owned(),
        ));
    }
    Ok(())
}

fn validate_file_name(name: &str) -> Result<(), StartupError> {
    match Path::new(name).file_name() {
        Some(file_name) if file_name == name => Ok(()),
        _ => Err(StartupError::InvalidParameter(format!(
            "Invalid file name: {:?}",
            name
        ))),
    }
}

/// Paths of the written artifacts, and the `kid` of the published key.
#[derive(Clone, Debug, PartialEq)]
pub struct SetupArtifacts {
    pub jwks: PathBuf,
    pub discovery: PathBuf,
    pub public_key: PathBuf,
    pub private_key: PathBuf,
    pub key_id: String,
}

/// Generate a key pair and write all artifacts below `config.output_dir`.
///
/// Artifacts are written one file at a time and the first failure aborts
/// the run. Files written before the failure are left in place.
pub fn run(
    config: &SetupConfiguration,
    generator: &dyn KeyGenerator,
) -> Result<SetupArtifacts, SetupError> {
    info!("Generating a {} bit key pair", config.key_bits);
    let private_key = generator
        .generate(config.key_bits)
        .map_err(SetupError::KeyGeneration)?;
    let public_key = private_key.to_public_key();

    create_output_dir(&config.output_dir)?;
    info!("Created directory {}", config.output_dir.display());

    let names = &config.file_names;
    let jwks_path = config.output_dir.join(&names.jwks);
    let jwks = write_artifact(&jwks_path, PUBLIC_FILE_MODE, |sink| {
        write_jwks(sink, std::slice::from_ref(&public_key))
    })?;

    if config.issuer.is_empty() {
        warn!(
            "No issuer configured, {} will use the placeholder jwks_uri {}",
            names.discovery, JWKS_URI_PLACEHOLDER
        );
    }
    let mut discovery = DiscoveryDocument::builder(config.issuer.as_str());
    if let Some(authorization_endpoint) = &config.authorization_endpoint {
        discovery = discovery.authorization_endpoint(authorization_endpoint.as_str());
    }
    let discovery = discovery.build();
    let discovery_path = config.output_dir.join(&names.discovery);
    write_artifact(&discovery_path, PUBLIC_FILE_MODE, |sink| {
        discovery.write_to(sink)
    })?;

    let public_key_path = config.output_dir.join(&names.public_key);
    write_artifact(&public_key_path, PUBLIC_FILE_MODE, |sink| {
        write_public_key(sink, &public_key)
    })?;

    let private_key_path = config.output_dir.join(&names.private_key);
    write_artifact(&private_key_path, PRIVATE_FILE_MODE, |sink| {
        write_private_key(sink, &private_key)
    })?;

    let key_id = jwks
        .keys
        .into_iter()
        .next()
        .map(|jwk| jwk.kid)
        .unwrap_or_default();
    Ok(SetupArtifacts {
        jwks: jwks_path,
        discovery: discovery_path,
        public_key: public_key_path,
        private_key: private_key_path,
        key_id,
    })
}

fn create_output_dir(path: &Path) -> Result<(), SetupError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIRECTORY_MODE);
    }
    builder
        .create(path)
        .and_then(|_| restrict_permissions(path, DIRECTORY_MODE))
        .map_err(|source| SetupError::CreateDirectory {
            path: path.to_owned(),
            source,
        })
}

/// Create `path`, hand it to `encode` and close it again.
///
/// The file is closed exactly once on every path.
fn write_artifact<T, F>(path: &Path, mode: u32, encode: F) -> Result<T, SetupError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T, EncodeError>,
{
    let file = create_file(path, mode).map_err(|source| SetupError::CreateFile {
        path: path.to_owned(),
        source,
    })?;
    let (file, value) = encode_and_flush(path, file, encode)?;
    file.sync_all().map_err(|source| SetupError::CloseFailed {
        path: path.to_owned(),
        source,
    })?;
    info!("Created {}", path.display());
    Ok(value)
}

/// Run `encode` against a buffered `sink` and flush everything to it.
///
/// Failures while encoding or writing are reported as [SetupError::Write],
/// failures while flushing the already encoded artifact as
/// [SetupError::CloseFailed].
fn encode_and_flush<W, T, F>(path: &Path, sink: W, encode: F) -> Result<(W, T), SetupError>
where
    W: Write,
    F: FnOnce(&mut BufWriter<W>) -> Result<T, EncodeError>,
{
    let mut sink = BufWriter::new(sink);
    let value = encode(&mut sink).map_err(|source| SetupError::Write {
        path: path.to_owned(),
        source,
    })?;
    let close_failed = |source: io::Error| SetupError::CloseFailed {
        path: path.to_owned(),
        source,
    };
    let mut inner = sink.into_inner().map_err(|e| close_failed(e.into_error()))?;
    inner.flush().map_err(close_failed)?;
    Ok((inner, value))
}

fn create_file(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    let file = options.open(path)?;
    // The creation mode is ignored for files that already exist.
    restrict_permissions(path, mode)?;
    Ok(file)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> io::Result<()> {
    use std::{fs::Permissions, os::unix::fs::PermissionsExt};

    std::fs::set_permissions(path, Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
