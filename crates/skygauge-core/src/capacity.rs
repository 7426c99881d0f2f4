//! Subnet capacity math.
//!
//! The provider reserves five addresses in every subnet: the network
//! address, three infrastructure addresses and the broadcast address.

use std::net::Ipv4Addr;

use crate::error::{CapacityError, CapacityResult};

/// Addresses the provider keeps for itself in every subnet.
pub const RESERVED_ADDRESSES: i64 = 5;

/// Fraction of the usable addresses of `cidr` that are still available.
///
/// `usable = 2^(32 - prefix) - 5`. The result is not clamped: a value above
/// `1.0` is passed through as reported. Blocks with no usable addresses
/// (`/30` and narrower) are rejected instead of dividing by zero.
pub fn available_percentage(cidr: &str, available: i64) -> CapacityResult<f64> {
    let (_, prefix) = parse_cidr(cidr)?;

    let usable = usable_addresses(prefix);
    if usable <= 0 {
        return Err(CapacityError::NoUsableAddresses {
            cidr: cidr.to_string(),
            prefix,
        });
    }

    Ok(available as f64 / usable as f64)
}

/// Number of addresses left for workloads in a block with the given prefix.
pub fn usable_addresses(prefix: u8) -> i64 {
    (1_i64 << (32 - u32::from(prefix))) - RESERVED_ADDRESSES
}

/// Parse strict `a.b.c.d/n` notation.
pub fn parse_cidr(cidr: &str) -> CapacityResult<(Ipv4Addr, u8)> {
    let invalid = |reason| CapacityError::Parse {
        cidr: cidr.to_string(),
        reason,
    };

    let (addr, prefix) = cidr.split_once('/').ok_or_else(|| invalid("missing prefix length"))?;

    let addr: Ipv4Addr = addr
        .parse()
        .map_err(|_| invalid("malformed IPv4 address"))?;

    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("prefix length is not an integer"));
    }
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| invalid("prefix length out of range"))?;
    if prefix > 32 {
        return Err(invalid("prefix length out of range"));
    }

    Ok((addr, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_small_subnet() {
        assert_eq!(available_percentage("10.1.0.0/27", 27), Ok(1.0));
    }

    #[test]
    fn partially_used_subnet() {
        assert_eq!(
            available_percentage("10.1.0.0/21", 1000),
            Ok(0.48947626040137054)
        );
    }

    #[test]
    fn formula_holds_across_prefixes() {
        for prefix in 0u8..=29 {
            let cidr = format!("10.0.0.0/{prefix}");
            let usable = (2f64).powi(32 - i32::from(prefix)) - 5.0;
            for available in [0_i64, 1, 3, 250] {
                assert_eq!(
                    available_percentage(&cidr, available).unwrap(),
                    available as f64 / usable,
                    "cidr {cidr}, available {available}"
                );
            }
        }
    }

    #[test]
    fn not_clamped_above_one() {
        let pct = available_percentage("10.1.0.0/27", 54).unwrap();
        assert_eq!(pct, 2.0);
    }

    #[test]
    fn extra_slash_segment_rejected() {
        let result = available_percentage("10.1.0.0/27/12", 25);
        assert!(matches!(result, Err(CapacityError::Parse { .. })));
        assert_eq!(result.unwrap_or_default(), 0.0);
    }

    #[test]
    fn fractional_prefix_rejected() {
        let result = available_percentage("10.1.0.0/2.7", 25);
        assert!(matches!(result, Err(CapacityError::Parse { .. })));
        assert_eq!(result.unwrap_or_default(), 0.0);
    }

    #[test]
    fn malformed_inputs_rejected() {
        for cidr in [
            "10.1.0.0",
            "10.1.0/24",
            "10.1.0.256/24",
            "10.1.0.0/",
            "10.1.0.0/33",
            "10.1.0.0/-1",
            "10.1.0.0/+8",
            " 10.1.0.0/24",
            "",
        ] {
            assert!(
                matches!(available_percentage(cidr, 1), Err(CapacityError::Parse { .. })),
                "{cidr:?} should not parse"
            );
        }
    }

    #[test]
    fn no_usable_addresses_is_an_error() {
        for prefix in [30u8, 31, 32] {
            let cidr = format!("10.1.0.0/{prefix}");
            assert_eq!(
                available_percentage(&cidr, 0),
                Err(CapacityError::NoUsableAddresses { cidr, prefix })
            );
        }
        // /29 still leaves three usable addresses.
        assert_eq!(available_percentage("10.1.0.0/29", 3), Ok(1.0));
    }

    #[test]
    fn usable_address_counts() {
        assert_eq!(usable_addresses(27), 27);
        assert_eq!(usable_addresses(21), 2043);
        assert_eq!(usable_addresses(0), (1_i64 << 32) - 5);
    }
}
