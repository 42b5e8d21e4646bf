//! The verification service catalog.

use serde::{Deserialize, Serialize};

/// A verification service offered through the proxy.
///
/// This is the key that links the pricing catalog, verification orders and
/// the provider modules: an order purchases quota for exactly one kind, and
/// every proxied call is metered against an order of the matching kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationKind {
    /// PAN card verification (incl. father's name lookup).
    Pan,
    /// Aadhaar verification via OTP or OCR.
    Aadhaar,
    /// GST identification number lookups.
    Gstin,
    /// MCA company/LLP master data.
    Mca,
    /// EPFO UAN lookup and passbook.
    Epfo,
    /// Voter ID verification.
    Voter,
    /// Passport verification.
    Passport,
    /// Vehicle RC and e-challan lookups.
    Vehicle,
    /// Driving licence verification.
    DrivingLicence,
    /// Criminal court record verification.
    Ccrv,
    /// Bank account ownership verification.
    BankAccount,
}

impl VerificationKind {
    /// All catalog entries, in display order.
    pub const ALL: &'static [Self] = &[
        Self::Pan,
        Self::Aadhaar,
        Self::Gstin,
        Self::Mca,
        Self::Epfo,
        Self::Voter,
        Self::Passport,
        Self::Vehicle,
        Self::DrivingLicence,
        Self::Ccrv,
        Self::BankAccount,
    ];

    /// The wire/database string for this variant.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Aadhaar => "aadhaar",
            Self::Gstin => "gstin",
            Self::Mca => "mca",
            Self::Epfo => "epfo",
            Self::Voter => "voter",
            Self::Passport => "passport",
            Self::Vehicle => "vehicle",
            Self::DrivingLicence => "drivinglicence",
            Self::Ccrv => "ccrv",
            Self::BankAccount => "bankaccount",
        }
    }

    /// Human-readable service title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Pan => "PAN Verification",
            Self::Aadhaar => "Aadhaar Verification",
            Self::Gstin => "GSTIN Verification",
            Self::Mca => "MCA Company Check",
            Self::Epfo => "EPFO Verification",
            Self::Voter => "Voter ID Verification",
            Self::Passport => "Passport Verification",
            Self::Vehicle => "Vehicle RC Verification",
            Self::DrivingLicence => "Driving Licence Verification",
            Self::Ccrv => "Criminal Record Verification",
            Self::BankAccount => "Bank Account Verification",
        }
    }
}

impl std::fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VerificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pan" => Ok(Self::Pan),
            "aadhaar" => Ok(Self::Aadhaar),
            "gstin" => Ok(Self::Gstin),
            "mca" => Ok(Self::Mca),
            "epfo" => Ok(Self::Epfo),
            "voter" => Ok(Self::Voter),
            "passport" => Ok(Self::Passport),
            "vehicle" => Ok(Self::Vehicle),
            "drivinglicence" => Ok(Self::DrivingLicence),
            "ccrv" => Ok(Self::Ccrv),
            "bankaccount" => Ok(Self::BankAccount),
            _ => Err(format!("unknown verification kind: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_all_kinds_roundtrip() {
        for kind in VerificationKind::ALL {
            assert_eq!(
                VerificationKind::from_str(kind.as_str()).unwrap(),
                *kind,
                "roundtrip failed for {kind}"
            );
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&VerificationKind::DrivingLicence).unwrap();
        assert_eq!(json, "\"drivinglicence\"");
        let kind: VerificationKind = serde_json::from_str("\"pan\"").unwrap();
        assert_eq!(kind, VerificationKind::Pan);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(VerificationKind::from_str("dna").is_err());
    }
}
