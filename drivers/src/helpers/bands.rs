use dsl_monitor_models::{
    Band,
    Bins,
    DownUp,
    ModeSubtype,
    ModeType,
};

/// Fills in the band plan if the parser did not provide one.
///
/// ADSL lines with a known annex use the fixed annex band plan. Everything else is derived from
/// the bit allocation.
pub fn generate_bands(bins: &mut Bins) {
    if !bins.bands.downstream.is_empty() || !bins.bands.upstream.is_empty() {
        return;
    }

    if bins.mode.kind.is_adsl_family() && bins.mode.subtype != ModeSubtype::Unknown {
        if let Some(bands) = adsl_bands(bins.mode.kind, bins.mode.subtype) {
            bins.bands = bands;
            return;
        }
    }

    bins.bands = bands_from_bits(bins);
}

fn adsl_bands(kind: ModeType, subtype: ModeSubtype) -> Option<DownUp<Vec<Band>>> {
    let upstream_start = match subtype {
        ModeSubtype::AnnexA | ModeSubtype::AnnexL | ModeSubtype::AnnexM => 6,
        ModeSubtype::AnnexB => 32,
        ModeSubtype::AnnexI | ModeSubtype::AnnexJ => 1,
        _ => return None,
    };
    let upstream_end = match subtype {
        ModeSubtype::AnnexA | ModeSubtype::AnnexI | ModeSubtype::AnnexL => 31,
        _ => 63,
    };
    let downstream_end = match (subtype, kind) {
        (ModeSubtype::AnnexL, _) => 127,
        (_, ModeType::Adsl2Plus) => 511,
        _ => 255,
    };

    Some(DownUp::new(
        vec![Band::new(upstream_end + 1, downstream_end)],
        vec![Band::new(upstream_start, upstream_end)],
    ))
}

/// Delimits contiguous runs of loaded subcarriers. A subcarrier loaded in both directions counts as
/// downstream.
fn bands_from_bits(bins: &Bins) -> DownUp<Vec<Band>> {
    let mut bands = DownUp::<Vec<Band>>::default();

    let bin_count = bins.mode.bin_count();
    let (down, up) = (&bins.bits.downstream.data, &bins.bits.upstream.data);
    if down.len() != bin_count || up.len() != bin_count {
        return bands;
    }

    // (start, end, is_downstream) of the run being built
    let mut current: Option<(usize, usize, bool)> = None;
    let push = |bands: &mut DownUp<Vec<Band>>, (start, end, is_downstream): (usize, usize, bool)| {
        let band = Band::new(start, end);
        if is_downstream {
            bands.downstream.push(band);
        } else {
            bands.upstream.push(band);
        }
    };

    for (i, (&d, &u)) in down.iter().zip(up.iter()).enumerate() {
        if d == 0 && u == 0 {
            continue;
        }
        let is_downstream = d > 0;
        current = match current {
            Some((start, _, dir)) if dir == is_downstream => Some((start, i, dir)),
            Some(run) => {
                push(&mut bands, run);
                Some((i, i, is_downstream))
            }
            None => Some((i, i, is_downstream)),
        };
    }
    if let Some(run) = current {
        push(&mut bands, run);
    }

    bands
}

/// Decides the direction of a subcarrier from the band plan. Gaps between bands are split at
/// their midpoint.
#[derive(Debug, Clone)]
pub struct BandDecider {
    max_index: Vec<usize>,
    is_downstream: Vec<bool>,
}

impl BandDecider {
    /// Returns `None` when there are no bands at all.
    pub fn new(bands: &DownUp<Vec<Band>>) -> Option<Self> {
        let mut all: Vec<(Band, bool)> = bands
            .downstream
            .iter()
            .map(|band| (*band, true))
            .chain(bands.upstream.iter().map(|band| (*band, false)))
            .collect();
        if all.is_empty() {
            return None;
        }
        // upstream first on equal starts
        all.sort_by_key(|(band, is_downstream)| (band.start, *is_downstream));

        let max_index = all.windows(2).map(|pair| (pair[0].0.end + pair[1].0.start) / 2).collect();
        let is_downstream = all.iter().map(|(_, is_downstream)| *is_downstream).collect();

        Some(Self {
            max_index,
            is_downstream,
        })
    }

    pub fn is_downstream(&self, index: usize) -> bool {
        self.max_index
            .iter()
            .position(|max| index <= *max)
            .and_then(|i| self.is_downstream.get(i))
            .or(self.is_downstream.last())
            .copied()
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsl_monitor_models::{
        is_valid_snr,
        BinsBits,
        BinsFloat,
        Mode,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn synthesizes_vdsl_bands_from_bits() {
        let mode = Mode::new(ModeType::Vdsl2, ModeSubtype::Profile17a);
        let mut bins = Bins::new(mode);
        assert_eq!(mode.bin_count(), 4096);

        let mut down = vec![0u8; 32];
        down.extend(std::iter::repeat(8).take(2000));
        down.extend(std::iter::repeat(0).take(2064));
        let mut up = vec![9u8; 32];
        up.extend(std::iter::repeat(0).take(4064));
        bins.bits = DownUp::new(BinsBits { data: down }, BinsBits { data: up });
        bins.snr.downstream = BinsFloat::new(8, vec![15.0; 512]);

        generate_bands(&mut bins);

        assert_eq!(bins.bands.downstream, vec![Band::new(32, 2031)]);
        assert_eq!(bins.bands.upstream, vec![Band::new(0, 31)]);
        assert_eq!(bins.snr.downstream.data.len() * bins.snr.downstream.group_size, mode.bin_count());
        assert_eq!(bins.snr.downstream.max_index(is_valid_snr), Some(511));

        let loaded = |data: &[u8]| -> Vec<usize> { (0..data.len()).filter(|i| data[*i] > 0).collect() };
        let down = loaded(&bins.bits.downstream.data);
        let up = loaded(&bins.bits.upstream.data);
        assert!(down.iter().all(|i| !up.contains(i)));
        assert!(down.iter().all(|i| bins.bands.downstream.iter().any(|b| b.contains(*i))));
        assert!(up.iter().all(|i| bins.bands.upstream.iter().any(|b| b.contains(*i))));
    }

    #[test]
    fn alternating_runs() {
        let mode = Mode::new(ModeType::Adsl2Plus, ModeSubtype::Unknown);
        let mut bins = Bins::new(mode);
        let mut down = vec![0u8; 512];
        let mut up = vec![0u8; 512];
        up[6..32].fill(4);
        down[40..100].fill(10);
        up[100..110].fill(2);
        down[110..400].fill(3);
        bins.bits = DownUp::new(BinsBits { data: down }, BinsBits { data: up });

        generate_bands(&mut bins);

        assert_eq!(bins.bands.downstream, vec![Band::new(40, 99), Band::new(110, 399)]);
        assert_eq!(bins.bands.upstream, vec![Band::new(6, 31), Band::new(100, 109)]);
    }

    #[test]
    fn adsl_annex_table() {
        let mut bins = Bins::new(Mode::new(ModeType::Adsl2Plus, ModeSubtype::AnnexB));
        generate_bands(&mut bins);
        assert_eq!(bins.bands.upstream, vec![Band::new(32, 63)]);
        assert_eq!(bins.bands.downstream, vec![Band::new(64, 511)]);

        let mut bins = Bins::new(Mode::new(ModeType::Adsl2, ModeSubtype::AnnexL));
        generate_bands(&mut bins);
        assert_eq!(bins.bands.upstream, vec![Band::new(6, 31)]);
        assert_eq!(bins.bands.downstream, vec![Band::new(32, 127)]);

        let mut bins = Bins::new(Mode::new(ModeType::Adsl, ModeSubtype::AnnexJ));
        generate_bands(&mut bins);
        assert_eq!(bins.bands.upstream, vec![Band::new(1, 63)]);
        assert_eq!(bins.bands.downstream, vec![Band::new(64, 255)]);
    }

    #[test]
    fn keeps_parsed_bands() {
        let mut bins = Bins::new(Mode::new(ModeType::Adsl2Plus, ModeSubtype::AnnexB));
        bins.bands.downstream = vec![Band::new(70, 500)];
        generate_bands(&mut bins);
        assert_eq!(bins.bands.downstream, vec![Band::new(70, 500)]);
        assert!(bins.bands.upstream.is_empty());
    }

    #[test]
    fn decides_by_midpoint() {
        let bands = DownUp::new(
            vec![Band::new(870, 1205), Band::new(1960, 4095)],
            vec![Band::new(32, 869), Band::new(1206, 1959)],
        );
        let decider = BandDecider::new(&bands).unwrap();
        assert!(!decider.is_downstream(0));
        assert!(!decider.is_downstream(869));
        assert!(decider.is_downstream(870));
        assert!(decider.is_downstream(1205));
        assert!(!decider.is_downstream(1206));
        assert!(decider.is_downstream(1960));
        assert!(decider.is_downstream(5000));

        let gap = DownUp::new(vec![Band::new(100, 200)], vec![Band::new(0, 49)]);
        let decider = BandDecider::new(&gap).unwrap();
        assert!(!decider.is_downstream(74));
        assert!(decider.is_downstream(75));

        assert!(BandDecider::new(&DownUp::default()).is_none());
    }
}
