use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Fps;
use crate::foundation::error::{AnimError, AnimResult};

/// Three-phase frame timeline as produced by the editing layer.
///
/// Output frame count is `intro.len() + loop.len() + exit.len()`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub intro: Vec<TimelineSlot>,
    #[serde(default, rename = "loop")]
    pub looped: Vec<TimelineSlot>,
    #[serde(default)]
    pub exit: Vec<TimelineSlot>,
    #[serde(default)]
    pub fps: Fps,
}

/// Timeline phase a slot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Intro,
    Loop,
    Exit,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Intro, Phase::Loop, Phase::Exit];
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Phase::Intro => "intro",
            Phase::Loop => "loop",
            Phase::Exit => "exit",
        })
    }
}

/// A slot located in timeline output order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotRef<'a> {
    /// 0-based index across all phases.
    pub global: usize,
    pub phase: Phase,
    /// 0-based index inside `phase`.
    pub local: usize,
    pub slot: &'a TimelineSlot,
}

impl Timeline {
    /// Parse a timeline from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> AnimResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| AnimError::validation(format!("parse timeline JSON: {e}")))
    }

    /// Parse a timeline from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> AnimResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            AnimError::validation(format!("open timeline JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Slots of one phase.
    pub fn phase(&self, phase: Phase) -> &[TimelineSlot] {
        match phase {
            Phase::Intro => &self.intro,
            Phase::Loop => &self.looped,
            Phase::Exit => &self.exit,
        }
    }

    /// Total output frames across all phases.
    pub fn total_frames(&self) -> usize {
        self.intro.len() + self.looped.len() + self.exit.len()
    }

    /// Reject timelines that cannot produce any frame.
    ///
    /// An empty loop phase is the caller's concern and is accepted here.
    pub fn validate(&self) -> AnimResult<()> {
        if self.total_frames() == 0 {
            return Err(AnimError::EmptyTimeline);
        }
        Fps::new(self.fps.0)?;
        Ok(())
    }

    /// Find the phase and local slot for output frame `global`.
    pub fn locate(&self, global: usize) -> Option<SlotRef<'_>> {
        let mut start = 0usize;
        for phase in Phase::ALL {
            let slots = self.phase(phase);
            if global < start + slots.len() {
                let local = global - start;
                return Some(SlotRef {
                    global,
                    phase,
                    local,
                    slot: &slots[local],
                });
            }
            start += slots.len();
        }
        None
    }

    /// All slots in output order.
    pub fn iter_slots(&self) -> impl Iterator<Item = SlotRef<'_>> + '_ {
        Phase::ALL
            .into_iter()
            .flat_map(move |phase| {
                self.phase(phase)
                    .iter()
                    .enumerate()
                    .map(move |(local, slot)| (phase, local, slot))
            })
            .enumerate()
            .map(|(global, (phase, local, slot))| SlotRef {
                global,
                phase,
                local,
                slot,
            })
    }

    /// Distinct mask URLs referenced anywhere in the timeline, sorted.
    pub fn mask_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .iter_slots()
            .flat_map(|s| s.slot.kind.layers())
            .filter_map(|region| region.mask_url().map(str::to_owned))
            .collect();
        urls.sort();
        urls.dedup();
        urls
    }
}

/// One timeline entry: what to draw plus device directives for that frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineSlot {
    #[serde(flatten)]
    pub kind: SlotKind,
    /// Vibration/LED directives, passed through untouched.
    #[serde(default, rename = "hardwareActions", skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<HardwareAction>,
}

impl TimelineSlot {
    pub fn full(source_frame_index: i64) -> Self {
        Self {
            kind: SlotKind::Full { source_frame_index },
            actions: Vec::new(),
        }
    }

    pub fn composite(regions: Regions, artifacts: Vec<Artifact>) -> Self {
        Self {
            kind: SlotKind::Composite { regions, artifacts },
            actions: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SlotKind {
    /// Reuse one decoded source frame verbatim.
    Full {
        #[serde(rename = "sourceFrameIndex")]
        source_frame_index: i64,
    },
    /// Layer region and artifact masks over black.
    Composite {
        #[serde(default)]
        regions: Regions,
        #[serde(default)]
        artifacts: Vec<Artifact>,
    },
}

impl SlotKind {
    /// Regions then artifacts, in compositing order. Empty for `Full`.
    pub fn layers(&self) -> Vec<&Region> {
        match self {
            SlotKind::Full { .. } => Vec::new(),
            SlotKind::Composite { regions, artifacts } => regions
                .iter()
                .map(|(_, r)| r)
                .chain(artifacts.iter().map(|a| &a.region))
                .collect(),
        }
    }
}

/// The closed set of face regions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_eye: Option<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_eye: Option<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouth: Option<Region>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionKey {
    LeftEye,
    RightEye,
    Mouth,
}

impl Regions {
    /// Populated regions in fixed order: left eye, right eye, mouth.
    pub fn iter(&self) -> impl Iterator<Item = (RegionKey, &Region)> + '_ {
        [
            (RegionKey::LeftEye, self.left_eye.as_ref()),
            (RegionKey::RightEye, self.right_eye.as_ref()),
            (RegionKey::Mouth, self.mouth.as_ref()),
        ]
        .into_iter()
        .filter_map(|(k, r)| r.map(|r| (k, r)))
    }
}

/// Normalised rectangle with an optional pre-positioned mask image.
///
/// The rectangle is editing metadata; compositing layers the full-frame mask
/// image as-is and never uses it for placement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Region {
    pub fn with_image(url: impl Into<String>) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 1.0,
            h: 1.0,
            corner_style: None,
            image_url: Some(url.into()),
        }
    }

    /// The mask URL, or `None` when absent, empty or whitespace-only.
    pub fn mask_url(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Free-form named region.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub region: Region,
}

/// Opaque device directive attached to a slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HardwareAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
