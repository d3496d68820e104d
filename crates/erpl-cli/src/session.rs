// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builds a live [`AdtSession`] from the stored credentials file, with CLI
//! global flags overriding individual fields (§4.1, §6.5, §6.6).

use erpl_error::{Error, ErrorKind};
use erpl_session::{AdtSession, SessionConfig};
use erpl_types::SapClient;

use crate::args::Args;
use crate::credentials::{self, Credentials};

/// Resolve connection fields from the credentials file and global flags,
/// then build a session. `--password-env` names an environment variable
/// read in place of a stored/blank password (§6.6).
pub fn build_session(args: &Args) -> Result<AdtSession, Error> {
    let path = credentials::default_path();
    let stored = Credentials::load(&path).ok();

    let host = args
        .flag("host")
        .map(str::to_string)
        .or_else(|| stored.as_ref().map(|c| c.host.clone()))
        .ok_or_else(|| Error::new("BuildSession", "", "no host configured: pass --host or run `login`", ErrorKind::Connection))?;
    let port = args.flag_u16("port").or_else(|| stored.as_ref().map(|c| c.port)).unwrap_or(443);
    let use_https = if args.flag_bool("https") {
        true
    } else if args.flag_bool("no-https") {
        false
    } else {
        stored.as_ref().map(|c| c.use_https).unwrap_or(true)
    };
    let client = args
        .flag("client")
        .map(str::to_string)
        .or_else(|| stored.as_ref().map(|c| c.client.clone()))
        .ok_or_else(|| Error::new("BuildSession", "", "no sap_client configured: pass --client or run `login`", ErrorKind::Connection))?;
    let user = args.flag("user").map(str::to_string).or_else(|| stored.as_ref().map(|c| c.user.clone())).unwrap_or_default();
    let password = match args.flag("password-env").map(std::env::var) {
        Some(Ok(value)) => value,
        Some(Err(_)) => {
            return Err(Error::new("BuildSession", "", "--password-env names a variable that is not set", ErrorKind::Authentication));
        }
        None => args
            .flag("password")
            .map(str::to_string)
            .or_else(|| std::env::var("SAP_PASSWORD").ok())
            .or_else(|| stored.as_ref().map(|c| c.password.clone()))
            .unwrap_or_default(),
    };

    let sap_client = SapClient::parse(&client).map_err(|e| Error::new("BuildSession", "", e.to_string(), ErrorKind::Connection))?;
    let mut config = SessionConfig::new(host, port, use_https, sap_client);
    if !user.is_empty() {
        config = config.with_credentials(user, password);
    }
    AdtSession::new(config)
}
