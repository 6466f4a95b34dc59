use crate::{
    constants::{ADDRESS_BITS, FULL_MASK, V4_MAPPED_OFFSET},
    errors::Error,
    helpers::{mask, prefix_len},
    types::{Cidr, PrefixTree},
};
use ipnet::IpNet;
use std::{net::IpAddr, str::FromStr};

// ─────────────────────────── normalizer ──────────────────────────────── //

#[inline]
fn canonical_addr(ip: IpAddr) -> [u8; 16] {
    match ip {
        IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
        IpAddr::V6(v6) => v6.octets(),
    }
}

impl Cidr {
    /// A single host: full-width mask.
    pub fn host(ip: IpAddr) -> Self {
        Cidr {
            addr: canonical_addr(ip),
            mask: FULL_MASK,
        }
    }

    /// A network prefix. IPv4 lengths are shifted into the mapped range.
    pub fn from_net(net: IpNet) -> Self {
        let plen = match net {
            IpNet::V4(n) => n.prefix_len() + V4_MAPPED_OFFSET,
            IpNet::V6(n) => n.prefix_len(),
        };
        debug_assert!(plen <= ADDRESS_BITS);
        Cidr {
            addr: canonical_addr(net.addr()),
            mask: mask(plen),
        }
    }

    /// Prefix length in the canonical 128-bit space.
    pub fn prefix_len(&self) -> u8 {
        prefix_len(&self.mask) as u8
    }
}

impl FromStr for Cidr {
    type Err = Error;

    /// Accepts "addr/prefix" OR plain address.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') {
            s.parse::<IpNet>()
                .map(Cidr::from_net)
                .map_err(|_| Error::BadAddress)
        } else {
            s.parse::<IpAddr>()
                .map(Cidr::host)
                .map_err(|_| Error::BadAddress)
        }
    }
}

#[inline]
fn utf8(cidr: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(cidr).map_err(|_| Error::BadAddress)
}

// ───────────────────────── text / typed wrappers ─────────────────────── //

impl<V> PrefixTree<V> {
    /// Register `value` under `cidr`. Fails with `NodeBusy` if the prefix is taken.
    pub fn add_cidr(&mut self, cidr: &str, value: V) -> Result<(), Error> {
        let c: Cidr = cidr.parse()?;
        self.insert(&c.addr, &c.mask, value, false)
    }

    /// Register or replace the value under `cidr`.
    pub fn set_cidr(&mut self, cidr: &str, value: V) -> Result<(), Error> {
        let c: Cidr = cidr.parse()?;
        self.insert(&c.addr, &c.mask, value, true)
    }

    /// Remove the value stored at exactly `cidr`; more specific prefixes stay.
    pub fn delete_cidr(&mut self, cidr: &str) -> Result<(), Error> {
        let c: Cidr = cidr.parse()?;
        self.delete(&c.addr, &c.mask, false)
    }

    /// Remove every value in the subnet `cidr`, including more specific ones.
    pub fn delete_range_cidr(&mut self, cidr: &str) -> Result<(), Error> {
        let c: Cidr = cidr.parse()?;
        self.delete(&c.addr, &c.mask, true)
    }

    /// Longest-prefix match. A bare address is looked up as a host.
    pub fn find_cidr(&self, cidr: &str) -> Result<Option<&V>, Error> {
        let c: Cidr = cidr.parse()?;
        self.lookup(&c.addr, &c.mask)
    }

    pub fn add_cidr_bytes(&mut self, cidr: &[u8], value: V) -> Result<(), Error> {
        self.add_cidr(utf8(cidr)?, value)
    }

    pub fn set_cidr_bytes(&mut self, cidr: &[u8], value: V) -> Result<(), Error> {
        self.set_cidr(utf8(cidr)?, value)
    }

    pub fn delete_cidr_bytes(&mut self, cidr: &[u8]) -> Result<(), Error> {
        self.delete_cidr(utf8(cidr)?)
    }

    pub fn delete_range_cidr_bytes(&mut self, cidr: &[u8]) -> Result<(), Error> {
        self.delete_range_cidr(utf8(cidr)?)
    }

    pub fn find_cidr_bytes(&self, cidr: &[u8]) -> Result<Option<&V>, Error> {
        self.find_cidr(utf8(cidr)?)
    }

    pub fn add_net(&mut self, net: IpNet, value: V) -> Result<(), Error> {
        let c = Cidr::from_net(net);
        self.insert(&c.addr, &c.mask, value, false)
    }

    pub fn set_net(&mut self, net: IpNet, value: V) -> Result<(), Error> {
        let c = Cidr::from_net(net);
        self.insert(&c.addr, &c.mask, value, true)
    }

    pub fn delete_net(&mut self, net: IpNet) -> Result<(), Error> {
        let c = Cidr::from_net(net);
        self.delete(&c.addr, &c.mask, false)
    }

    pub fn delete_range_net(&mut self, net: IpNet) -> Result<(), Error> {
        let c = Cidr::from_net(net);
        self.delete(&c.addr, &c.mask, true)
    }

    /// Longest-prefix match for a single address.
    pub fn find_ip(&self, ip: IpAddr) -> Option<&V> {
        let c = Cidr::host(ip);
        // widths always agree for a normalized host
        self.lookup(&c.addr, &c.mask).ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v4_is_mapped_and_shifted() {
        let c: Cidr = "10.1.0.0/16".parse().unwrap();
        assert_eq!(c.prefix_len(), 112);
        assert_eq!(&c.addr[..12], &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff]);
        assert_eq!(&c.addr[12..], &[10, 1, 0, 0]);
    }

    #[test]
    fn bare_address_is_a_host() {
        let v4: Cidr = "192.168.0.1".parse().unwrap();
        assert_eq!(v4.prefix_len(), 128);
        let v6: Cidr = "2001:db8::1".parse().unwrap();
        assert_eq!(v6.prefix_len(), 128);
        assert_eq!(v6.addr[0], 0x20);
        assert_eq!(v6.addr[15], 1);
    }

    #[test]
    fn v6_length_is_kept() {
        let c: Cidr = "2001:db8::/32".parse().unwrap();
        assert_eq!(c.prefix_len(), 32);
    }

    #[test]
    fn host_bits_survive_normalization() {
        let c: Cidr = "10.1.2.3/8".parse().unwrap();
        assert_eq!(c.prefix_len(), 104);
        assert_eq!(&c.addr[12..], &[10, 1, 2, 3]);
    }

    #[test]
    fn garbage_is_bad_address() {
        for bad in ["", "10.0.0", "10.0.0.0/33", "::1/129", "abc", "10.0.0.0/", "1.2.3.4/x"] {
            assert_eq!(bad.parse::<Cidr>(), Err(Error::BadAddress), "{bad:?}");
        }
        let mut tree: PrefixTree<u8> = PrefixTree::new();
        assert_eq!(tree.add_cidr_bytes(&[0xff, 0xfe], 1), Err(Error::BadAddress));
    }
}
