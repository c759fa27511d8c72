// Review buckets for scraped reference candidates

use serde::{Deserialize, Serialize};

use crate::entities::reference::ReferenceRecord;
use crate::error::ReviewError;
use crate::value_objects::ReferenceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Skipped,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Skipped => "skipped",
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, ReviewStatus::Pending)
    }

    /// Pending moves to either resolution; repeating a resolution is a no-op.
    fn resolve(self, target: ReviewStatus, name: &str) -> Result<ReviewStatus, ReviewError> {
        match (self, target) {
            (ReviewStatus::Pending, next) => Ok(next),
            (current, next) if current == next => Ok(current),
            (current, _) => Err(ReviewError::AlreadyResolved {
                name: name.to_string(),
                status: current.as_str(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    pub name: String,
    pub data: ReferenceRecord,
    pub source_url: String,
    pub status: ReviewStatus,
}

impl ReviewEntry {
    pub fn new(data: ReferenceRecord, source_url: impl Into<String>) -> Self {
        Self {
            name: data.name().to_string(),
            data,
            source_url: source_url.into(),
            status: ReviewStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailEntry {
    pub name: String,
    pub error: String,
    pub source_url: String,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewList {
    Candidates,
    Failed,
}

impl ReviewList {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewList::Candidates => "candidates",
            ReviewList::Failed => "failed",
        }
    }
}

impl std::str::FromStr for ReviewList {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "candidates" | "candidate" => Ok(ReviewList::Candidates),
            "failed" | "failures" => Ok(ReviewList::Failed),
            other => Err(format!("unknown review list '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReviewBucket {
    pub candidates: Vec<ReviewEntry>,
    pub existing: Vec<String>,
    pub failed: Vec<FailEntry>,
}

impl ReviewBucket {
    fn statuses(&self) -> impl Iterator<Item = ReviewStatus> + '_ {
        self.candidates
            .iter()
            .map(|entry| entry.status)
            .chain(self.failed.iter().map(|entry| entry.status))
    }

    pub fn entries_to_review(&self) -> usize {
        self.candidates.len() + self.failed.len()
    }
}

/// Per-kind review state produced by a prepare run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReviewBoard {
    pub spells: ReviewBucket,
    pub items: ReviewBucket,
    pub feats: ReviewBucket,
}

impl ReviewBoard {
    pub fn bucket(&self, kind: ReferenceKind) -> &ReviewBucket {
        match kind {
            ReferenceKind::Spell => &self.spells,
            ReferenceKind::MagicItem => &self.items,
            ReferenceKind::Feat => &self.feats,
        }
    }

    pub fn bucket_mut(&mut self, kind: ReferenceKind) -> &mut ReviewBucket {
        match kind {
            ReferenceKind::Spell => &mut self.spells,
            ReferenceKind::MagicItem => &mut self.items,
            ReferenceKind::Feat => &mut self.feats,
        }
    }

    pub fn entries_to_review(&self) -> usize {
        ReferenceKind::ALL
            .iter()
            .map(|kind| self.bucket(*kind).entries_to_review())
            .sum()
    }

    pub fn unresolved(&self) -> usize {
        ReferenceKind::ALL
            .iter()
            .flat_map(|kind| self.bucket(*kind).statuses())
            .filter(|status| !status.is_resolved())
            .count()
    }

    /// Every candidate and failed entry has been approved or skipped.
    pub fn review_ready(&self) -> bool {
        self.unresolved() == 0
    }

    pub fn set_status(
        &mut self,
        kind: ReferenceKind,
        list: ReviewList,
        index: usize,
        status: ReviewStatus,
    ) -> Result<(), ReviewError> {
        let bucket = self.bucket_mut(kind);
        let out_of_range = ReviewError::IndexOutOfRange {
            kind,
            list: list.as_str(),
            index,
        };
        let (name, current) = match list {
            ReviewList::Candidates => {
                let entry = bucket.candidates.get_mut(index).ok_or(out_of_range)?;
                (&entry.name, &mut entry.status)
            }
            ReviewList::Failed => {
                let entry = bucket.failed.get_mut(index).ok_or(out_of_range)?;
                (&entry.name, &mut entry.status)
            }
        };
        *current = current.resolve(status, name)?;
        Ok(())
    }

    /// Replaces a candidate's data in place. The status is left unchanged.
    pub fn edit_candidate(
        &mut self,
        kind: ReferenceKind,
        index: usize,
        record: ReferenceRecord,
    ) -> Result<(), ReviewError> {
        if record.kind() != kind {
            return Err(ReviewError::KindMismatch {
                expected: kind,
                actual: record.kind(),
            });
        }
        record.validate()?;
        let entry = self
            .bucket_mut(kind)
            .candidates
            .get_mut(index)
            .ok_or(ReviewError::IndexOutOfRange {
                kind,
                list: ReviewList::Candidates.as_str(),
                index,
            })?;
        entry.name = record.name().to_string();
        entry.data = record;
        Ok(())
    }

    pub fn approved_batch(&self) -> ApprovedBatch {
        let approved = |kind: ReferenceKind| {
            self.bucket(kind)
                .candidates
                .iter()
                .filter(|entry| entry.status == ReviewStatus::Approved)
                .map(|entry| entry.data.clone())
                .collect::<Vec<_>>()
        };
        ApprovedBatch {
            spells: approved(ReferenceKind::Spell),
            items: approved(ReferenceKind::MagicItem),
            feats: approved(ReferenceKind::Feat),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ApprovedBatch {
    pub spells: Vec<ReferenceRecord>,
    pub items: Vec<ReferenceRecord>,
    pub feats: Vec<ReferenceRecord>,
}

impl ApprovedBatch {
    pub fn get(&self, kind: ReferenceKind) -> &[ReferenceRecord] {
        match kind {
            ReferenceKind::Spell => &self.spells,
            ReferenceKind::MagicItem => &self.items,
            ReferenceKind::Feat => &self.feats,
        }
    }

    pub fn len(&self) -> usize {
        self.spells.len() + self.items.len() + self.feats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedFailure {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KindCommitReport {
    pub inserted: Vec<String>,
    pub failed: Vec<NamedFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommitReport {
    pub spells: KindCommitReport,
    pub items: KindCommitReport,
    pub feats: KindCommitReport,
}

impl CommitReport {
    pub fn get(&self, kind: ReferenceKind) -> &KindCommitReport {
        match kind {
            ReferenceKind::Spell => &self.spells,
            ReferenceKind::MagicItem => &self.items,
            ReferenceKind::Feat => &self.feats,
        }
    }

    pub fn get_mut(&mut self, kind: ReferenceKind) -> &mut KindCommitReport {
        match kind {
            ReferenceKind::Spell => &mut self.spells,
            ReferenceKind::MagicItem => &mut self.items,
            ReferenceKind::Feat => &mut self.feats,
        }
    }

    pub fn total_inserted(&self) -> usize {
        ReferenceKind::ALL.iter().map(|kind| self.get(*kind).inserted.len()).sum()
    }

    pub fn total_failed(&self) -> usize {
        ReferenceKind::ALL.iter().map(|kind| self.get(*kind).failed.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::reference::{FeatRecord, MagicItemRecord, SpellRecord};

    fn spell(name: &str) -> ReferenceRecord {
        ReferenceRecord::Spell(SpellRecord {
            name: name.to_string(),
            level: 1,
            school: Some("Evocation".to_string()),
            casting_time: None,
            range: None,
            components: None,
            duration: None,
            description: "Bright light.".to_string(),
            higher_levels: None,
        })
    }

    fn board() -> ReviewBoard {
        let mut board = ReviewBoard::default();
        board.spells.candidates.push(ReviewEntry::new(spell("Shield"), "https://a"));
        board.spells.candidates.push(ReviewEntry::new(spell("Sleep"), "https://b"));
        board.feats.failed.push(FailEntry {
            name: "Lucky".to_string(),
            error: "Rate limited (429)".to_string(),
            source_url: "https://c".to_string(),
            status: ReviewStatus::Pending,
        });
        board
    }

    #[test]
    fn review_ready_once_every_entry_is_resolved() {
        let mut board = board();
        assert!(!board.review_ready());
        board
            .set_status(ReferenceKind::Spell, ReviewList::Candidates, 0, ReviewStatus::Approved)
            .expect("approve");
        board
            .set_status(ReferenceKind::Spell, ReviewList::Candidates, 1, ReviewStatus::Skipped)
            .expect("skip");
        assert_eq!(board.unresolved(), 1);
        board
            .set_status(ReferenceKind::Feat, ReviewList::Failed, 0, ReviewStatus::Skipped)
            .expect("skip failure");
        assert!(board.review_ready());

        let batch = board.approved_batch();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.spells[0].name(), "Shield");
    }

    #[test]
    fn a_new_pending_entry_reopens_the_gate() {
        let mut board = board();
        board
            .set_status(ReferenceKind::Spell, ReviewList::Candidates, 0, ReviewStatus::Approved)
            .expect("approve");
        board
            .set_status(ReferenceKind::Spell, ReviewList::Candidates, 1, ReviewStatus::Approved)
            .expect("approve");
        board
            .set_status(ReferenceKind::Feat, ReviewList::Failed, 0, ReviewStatus::Approved)
            .expect("approve failure");
        assert!(board.review_ready());

        board.items.candidates.push(ReviewEntry::new(
            ReferenceRecord::MagicItem(MagicItemRecord {
                name: "Cloak of Elvenkind".to_string(),
                item_type: Some("Wondrous item".to_string()),
                rarity: Some("Uncommon".to_string()),
                requires_attunement: Some("Yes".to_string()),
                description: "Hood up, you are hard to see.".to_string(),
                properties: None,
            }),
            "https://d",
        ));
        assert!(!board.review_ready());
        assert_eq!(board.unresolved(), 1);

        board
            .set_status(ReferenceKind::MagicItem, ReviewList::Candidates, 0, ReviewStatus::Approved)
            .expect("approve item");
        assert!(board.review_ready());
    }

    #[test]
    fn empty_board_is_trivially_ready() {
        assert!(ReviewBoard::default().review_ready());
    }

    #[test]
    fn resolved_entries_cannot_flip() {
        let mut board = board();
        board
            .set_status(ReferenceKind::Spell, ReviewList::Candidates, 0, ReviewStatus::Approved)
            .expect("approve");
        board
            .set_status(ReferenceKind::Spell, ReviewList::Candidates, 0, ReviewStatus::Approved)
            .expect("repeat approve is a no-op");
        let err = board
            .set_status(ReferenceKind::Spell, ReviewList::Candidates, 0, ReviewStatus::Skipped)
            .unwrap_err();
        assert!(matches!(err, ReviewError::AlreadyResolved { status: "approved", .. }));
    }

    #[test]
    fn edit_replaces_name_and_checks_kind() {
        let mut board = board();
        board
            .edit_candidate(ReferenceKind::Spell, 1, spell("Sleep (2024)"))
            .expect("edit");
        assert_eq!(board.spells.candidates[1].name, "Sleep (2024)");

        let feat = ReferenceRecord::Feat(FeatRecord {
            name: "Alert".to_string(),
            prerequisites: None,
            description: String::new(),
            benefits: None,
        });
        assert!(matches!(
            board.edit_candidate(ReferenceKind::Spell, 0, feat),
            Err(ReviewError::KindMismatch { .. })
        ));
        assert!(matches!(
            board.edit_candidate(ReferenceKind::Spell, 9, spell("Nope")),
            Err(ReviewError::IndexOutOfRange { index: 9, .. })
        ));
    }
}
