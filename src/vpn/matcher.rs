// vpn/matcher.rs - Pair persisted NAS rows with live peer samples

use ipnetwork::IpNetwork;
use std::net::IpAddr;

use super::probe::PeerSample;
use crate::database::models::Nas;

/// Address assigned to a NAS on the mesh; accepts a bare IP or CIDR notation
pub fn vpn_address(vpn_ip: &str) -> Option<IpAddr> {
    let trimmed = vpn_ip.trim();
    trimmed
        .parse::<IpAddr>()
        .ok()
        .or_else(|| trimmed.parse::<IpNetwork>().ok().map(|net| net.ip()))
}

/// Public key equality wins; otherwise the peer whose allowed IPs contain the
/// NAS address, preferring the most specific prefix.
pub fn match_sample<'a>(nas: &Nas, samples: &'a [PeerSample]) -> Option<&'a PeerSample> {
    if let Some(key) = nas.vpn_public_key.as_deref().filter(|k| !k.is_empty()) {
        if let Some(sample) = samples.iter().find(|s| s.public_key == key) {
            return Some(sample);
        }
    }

    let address = nas.vpn_ip.as_deref().and_then(vpn_address)?;

    let mut best: Option<(&PeerSample, u8)> = None;
    for sample in samples {
        let prefix = sample
            .allowed_ips
            .iter()
            .filter(|net| net.contains(address))
            .map(|net| net.prefix())
            .max();

        if let Some(prefix) = prefix {
            if best.map_or(true, |(_, current)| prefix > current) {
                best = Some((sample, prefix));
            }
        }
    }

    best.map(|(sample, _)| sample)
}
