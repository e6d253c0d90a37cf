// Authority substitution for per-domain requests.
//
// A server configured as `https://s.test/` serves every custom domain it
// knows about, so probing domain `doma.in` means talking to
// `https://doma.in/` with the same credentials.

use url::Url;

use crate::error::Error;

/// Replace host and port of `url` with `authority` (`host` or `host:port`).
///
/// Scheme, path and query are preserved. A port present on `url` but not in
/// `authority` is dropped, since the authority replaces it as a whole.
pub fn replace_authority(url: &Url, authority: &str) -> Result<Url, Error> {
    let invalid = || Error::InvalidAuthority {
        url: url.to_string(),
        authority: authority.to_owned(),
    };

    let (host, port) = split_authority(authority).ok_or_else(invalid)?;

    let mut replaced = url.clone();
    replaced.set_host(Some(host))?;
    replaced.set_port(port).map_err(|()| invalid())?;
    Ok(replaced)
}

fn split_authority(authority: &str) -> Option<(&str, Option<u16>)> {
    let authority = authority.trim();
    if authority.is_empty() {
        return None;
    }

    // Bracketed IPv6 literals carry colons of their own.
    if authority.starts_with('[') {
        let end = authority.find(']')?;
        let (host, rest) = authority.split_at(end + 1);
        return match rest.strip_prefix(':') {
            Some(port) => Some((host, Some(port.parse().ok()?))),
            None if rest.is_empty() => Some((host, None)),
            None => None,
        };
    }

    match authority.rsplit_once(':') {
        Some((host, port)) => Some((host, Some(port.parse().ok()?))),
        None => Some((authority, None)),
    }
}
