use serde::{
    Serialize,
    Serializer,
};
use std::{
    convert::Infallible,
    fmt,
    str::FromStr,
};
use strum::{
    Display,
    EnumIter,
};

#[derive(Debug, Default, Clone, Copy, Display, EnumIter, PartialEq, Eq, Hash)]
pub enum ModeType {
    #[default]
    Unknown,
    #[strum(to_string = "ADSL")]
    Adsl,
    #[strum(to_string = "ADSL2")]
    Adsl2,
    #[strum(to_string = "ADSL2+")]
    Adsl2Plus,
    #[strum(to_string = "VDSL2")]
    Vdsl2,
}

impl ModeType {
    pub fn is_adsl_family(self) -> bool {
        matches!(self, ModeType::Adsl | ModeType::Adsl2 | ModeType::Adsl2Plus)
    }
}

#[derive(Debug, Default, Clone, Copy, Display, EnumIter, PartialEq, Eq, Hash)]
pub enum ModeSubtype {
    #[default]
    Unknown,
    #[strum(to_string = "Annex A")]
    AnnexA,
    #[strum(to_string = "Annex B")]
    AnnexB,
    #[strum(to_string = "Annex I")]
    AnnexI,
    #[strum(to_string = "Annex J")]
    AnnexJ,
    #[strum(to_string = "Annex L")]
    AnnexL,
    #[strum(to_string = "Annex M")]
    AnnexM,
    #[strum(to_string = "Profile 8a")]
    Profile8a,
    #[strum(to_string = "Profile 8b")]
    Profile8b,
    #[strum(to_string = "Profile 8c")]
    Profile8c,
    #[strum(to_string = "Profile 8d")]
    Profile8d,
    #[strum(to_string = "Profile 12a")]
    Profile12a,
    #[strum(to_string = "Profile 12b")]
    Profile12b,
    #[strum(to_string = "Profile 17a")]
    Profile17a,
    #[strum(to_string = "Profile 30a")]
    Profile30a,
    #[strum(to_string = "Profile 35b")]
    Profile35b,
}

/// Profile tokens in matching order. Checked before any type token.
const PROFILE_TOKENS: [(&str, ModeSubtype); 9] = [
    ("8a", ModeSubtype::Profile8a),
    ("8b", ModeSubtype::Profile8b),
    ("8c", ModeSubtype::Profile8c),
    ("8d", ModeSubtype::Profile8d),
    ("12a", ModeSubtype::Profile12a),
    ("12b", ModeSubtype::Profile12b),
    ("17a", ModeSubtype::Profile17a),
    ("30a", ModeSubtype::Profile30a),
    ("35b", ModeSubtype::Profile35b),
];

const ANNEX_TOKENS: [(&str, ModeSubtype); 6] = [
    ("annexa", ModeSubtype::AnnexA),
    ("annexb", ModeSubtype::AnnexB),
    ("annexi", ModeSubtype::AnnexI),
    ("annexj", ModeSubtype::AnnexJ),
    ("annexl", ModeSubtype::AnnexL),
    ("annexm", ModeSubtype::AnnexM),
];

/// Line mode: the DSL standard in use plus its annex or VDSL2 profile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mode {
    pub kind: ModeType,
    pub subtype: ModeSubtype,
}

impl Mode {
    pub fn new(kind: ModeType, subtype: ModeSubtype) -> Self {
        Self { kind, subtype }
    }

    /// Parses free-form mode descriptions such as `"VDSL2 17a Annex B"`, `"G.993.2"` or `"ADSL2+"`.
    ///
    /// Whitespace and underscores are ignored and matching is case-insensitive. A profile token
    /// always wins, so a VDSL2 string mentioning an annex still yields the profile. Annex tokens
    /// are only considered for the ADSL family.
    pub fn parse(input: &str) -> Self {
        let normalized: String = input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        let s = normalized.as_str();

        if let Some((_, subtype)) = PROFILE_TOKENS.iter().find(|(token, _)| s.contains(token)) {
            return Self::new(ModeType::Vdsl2, *subtype);
        }

        if s.contains("adsl") || s.contains("g.dmt") || s.contains("g.992") {
            let kind = if s.contains("adsl2+") || s.contains("adsl2p") || s.contains("g.992.5") {
                ModeType::Adsl2Plus
            } else if s.contains("adsl2") || s.contains("g.992.3") {
                ModeType::Adsl2
            } else {
                ModeType::Adsl
            };
            let subtype = ANNEX_TOKENS
                .iter()
                .find(|(token, _)| s.contains(token))
                .map(|(_, subtype)| *subtype)
                .unwrap_or_default();
            return Self::new(kind, subtype);
        }

        if s.contains("vdsl2") || s.contains("g.993.2") || s.contains("g.993.5") {
            return Self::new(ModeType::Vdsl2, ModeSubtype::Unknown);
        }

        Self::default()
    }

    /// Number of subcarriers used by this mode.
    pub fn bin_count(&self) -> usize {
        match self.kind {
            ModeType::Adsl | ModeType::Adsl2 => 256,
            ModeType::Adsl2Plus => 512,
            ModeType::Vdsl2 => match self.subtype {
                ModeSubtype::Profile8a | ModeSubtype::Profile8b | ModeSubtype::Profile8d => 2048,
                ModeSubtype::Profile8c => 1972,
                ModeSubtype::Profile12a | ModeSubtype::Profile12b => 2783,
                ModeSubtype::Profile17a => 4096,
                ModeSubtype::Profile30a => 3479,
                _ => 8192,
            },
            ModeType::Unknown => 8192,
        }
    }

    /// Subcarrier spacing in kHz.
    pub fn carrier_spacing(&self) -> f64 {
        if self.kind == ModeType::Vdsl2 && self.subtype == ModeSubtype::Profile30a {
            8.625
        } else {
            4.3125
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subtype == ModeSubtype::Unknown {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {}", self.kind, self.subtype)
        }
    }
}

impl FromStr for Mode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator as _;

    #[test]
    fn profile_dominates_annex() {
        assert_eq!(
            Mode::parse("VDSL2 17a Annex B"),
            Mode::new(ModeType::Vdsl2, ModeSubtype::Profile17a)
        );
    }

    #[test]
    fn parses_adsl_family() {
        assert_eq!(Mode::parse("G.992.5"), Mode::new(ModeType::Adsl2Plus, ModeSubtype::Unknown));
        assert_eq!(Mode::parse("adsl annexm"), Mode::new(ModeType::Adsl, ModeSubtype::AnnexM));
        assert_eq!(Mode::parse("ADSL2 Annex_J"), Mode::new(ModeType::Adsl2, ModeSubtype::AnnexJ));
        assert_eq!(Mode::parse("G.DMT"), Mode::new(ModeType::Adsl, ModeSubtype::Unknown));
    }

    #[test]
    fn parses_vdsl_without_profile() {
        assert_eq!(Mode::parse("G.993.2"), Mode::new(ModeType::Vdsl2, ModeSubtype::Unknown));
        assert_eq!(Mode::parse("VDSL2"), Mode::new(ModeType::Vdsl2, ModeSubtype::Unknown));
        assert_eq!(Mode::parse("something else"), Mode::default());
    }

    #[test]
    fn annex_ignored_outside_adsl() {
        assert_eq!(
            Mode::parse("VDSL2 Annex B"),
            Mode::new(ModeType::Vdsl2, ModeSubtype::Unknown)
        );
    }

    #[test]
    fn display_parses_back() {
        for kind in ModeType::iter() {
            for subtype in ModeSubtype::iter() {
                let valid = match subtype {
                    ModeSubtype::Unknown => true,
                    ModeSubtype::AnnexA
                    | ModeSubtype::AnnexB
                    | ModeSubtype::AnnexI
                    | ModeSubtype::AnnexJ
                    | ModeSubtype::AnnexL
                    | ModeSubtype::AnnexM => kind.is_adsl_family(),
                    _ => kind == ModeType::Vdsl2,
                };
                if !valid || kind == ModeType::Unknown {
                    continue;
                }
                let mode = Mode::new(kind, subtype);
                assert_eq!(Mode::parse(&mode.to_string()), mode, "{mode}");
            }
        }
    }

    #[test]
    fn bin_count_and_spacing_are_positive() {
        for kind in ModeType::iter() {
            for subtype in ModeSubtype::iter() {
                let mode = Mode::new(kind, subtype);
                assert!(mode.bin_count() > 0);
                assert!(mode.carrier_spacing() > 0.0);
            }
        }
        assert_eq!(Mode::new(ModeType::Vdsl2, ModeSubtype::Profile8c).bin_count(), 1972);
        assert_eq!(Mode::new(ModeType::Vdsl2, ModeSubtype::Profile8b).bin_count(), 2048);
        assert_eq!(Mode::new(ModeType::Vdsl2, ModeSubtype::Profile30a).carrier_spacing(), 8.625);
        assert_eq!(Mode::new(ModeType::Adsl2Plus, ModeSubtype::AnnexB).bin_count(), 512);
    }
}
