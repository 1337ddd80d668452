/*! Word/transcription extraction and `%pho:` reconciliation.

The number of words a speaker utters in a tier is compared to the number of tokens of
the `%pho:` sub-tier:

- with no `%pho:` sub-tier, one is added with a placeholder per word,
- as long as nothing has been transcribed, placeholders are added/removed to match,
- once transcription started, mismatches are only reported.
!*/
use std::cmp::Ordering;
use std::collections::BTreeMap;

use log::debug;

use crate::error::Error;
use crate::grammar::{
    mentions_speaker, split_transcriptions, ExtractedWord, Grammar, TokenKind, Transcription,
    PHO_LABEL, PLACEHOLDER,
};

use super::main_tier::MainTier;
use super::status::{PlaceholderChange, ReconciliationStatus};
use super::sub_tier::SubTier;
use super::TierError;

impl MainTier {
    /// Concatenated content lines (without the label).
    pub fn content_text(&self) -> String {
        self.contents.concat()
    }

    /// Words attributed to `code`, if they have been extracted.
    pub fn words_uttered_by(&self, code: &str) -> Option<&[ExtractedWord]> {
        self.words.get(code).map(Vec::as_slice)
    }

    /// Sub-tier indices grouped by label, if [MainTier::categorize_subtiers] ran.
    pub fn sub_tiers_by_label(&self) -> Option<&BTreeMap<String, Vec<usize>>> {
        self.sub_tiers_by_label.as_ref()
    }

    /// Tokens of the `%pho:` sub-tier, if they have been extracted.
    pub fn transcriptions(&self) -> Option<&[Transcription]> {
        self.transcriptions.as_deref()
    }

    /// Status of the last reconciliation.
    pub fn status(&self) -> Option<ReconciliationStatus> {
        self.status
    }

    fn record(&mut self, error: TierError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    /// Extract the words uttered by `code` from the content lines.
    ///
    /// Does nothing if the speaker marker (`_<code>_`) does not appear in the tier.
    /// Lines that do not match the grammar are recorded as tier errors.
    /// Can only run once per speaker code.
    pub fn extract_words_by_speaker(&mut self, grammar: &Grammar, code: &str) -> Result<(), Error> {
        self.ensure_parsed("word extraction")?;
        if self.words.contains_key(code) {
            return Err(Error::Precondition(format!(
                "words of {} already extracted from the tier at line {}",
                code,
                self.line_no()
            )));
        }

        let mut words = Vec::new();
        if mentions_speaker(&self.to_string(), code) {
            for line in self.collapsed_contents() {
                match grammar.extract_annotations(&line) {
                    Some(extracted) => {
                        words.extend(extracted.into_iter().filter(|word| word.speaker == code))
                    }
                    None => self.record(TierError::ContentMismatch { line }),
                }
            }

            if words.is_empty() {
                self.record(TierError::NoWordsForSpeaker {
                    code: code.to_string(),
                });
            }
        }

        self.words.insert(code.to_string(), words);
        Ok(())
    }

    /// Group sub-tiers by label. Can only run once.
    pub fn categorize_subtiers(&mut self) -> Result<(), Error> {
        self.ensure_parsed("sub-tier categorization")?;
        if self.sub_tiers_by_label.is_some() {
            return Err(Error::Precondition(format!(
                "sub-tiers of the tier at line {} already categorized",
                self.line_no()
            )));
        }

        let mut by_label: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, sub_tier) in self.sub_tiers.iter().enumerate() {
            by_label
                .entry(sub_tier.label().to_string())
                .or_default()
                .push(idx);
        }
        self.sub_tiers_by_label = Some(by_label);
        Ok(())
    }

    /// indices of the `%pho:` sub-tiers, categorizing if needed.
    fn pho_indices(&mut self) -> Result<Vec<usize>, Error> {
        if self.sub_tiers_by_label.is_none() {
            self.categorize_subtiers()?;
        }
        Ok(self
            .sub_tiers_by_label
            .as_ref()
            .and_then(|by_label| by_label.get(PHO_LABEL))
            .cloned()
            .unwrap_or_default())
    }

    /// Split and classify the tokens of the `%pho:` sub-tier.
    ///
    /// No-op without a `%pho:` sub-tier. With more than one, an error is recorded
    /// and nothing is extracted. Can be run again after the sub-tier changed.
    pub fn extract_phonetic_transcriptions(&mut self) -> Result<(), Error> {
        self.ensure_parsed("transcription extraction")?;
        let pho = self.pho_indices()?;

        match pho.as_slice() {
            [] => (),
            [idx] => {
                let transcriptions = split_transcriptions(self.sub_tiers[*idx].contents());
                let malformed: Vec<String> = transcriptions
                    .iter()
                    .filter(|t| t.kind == TokenKind::Malformed)
                    .map(|t| t.token.clone())
                    .collect();
                for token in malformed {
                    self.record(TierError::MalformedTranscription { token });
                }
                self.transcriptions = Some(transcriptions);
            }
            many => self.record(TierError::MultiplePhoSubTiers { count: many.len() }),
        }
        Ok(())
    }

    /// Insert `sub_tier` before every other sub-tier, keeping the label groups in sync.
    fn prepend_sub_tier(&mut self, sub_tier: SubTier) {
        if let Some(by_label) = self.sub_tiers_by_label.as_mut() {
            by_label
                .values_mut()
                .flat_map(|indices| indices.iter_mut())
                .for_each(|idx| *idx += 1);
            by_label
                .entry(sub_tier.label().to_string())
                .or_default()
                .insert(0, 0);
        }
        self.sub_tiers.insert(0, sub_tier);
    }

    /// Reconcile the `%pho:` sub-tier with the words uttered by `code`.
    ///
    /// Placeholders are only added or removed while none has been replaced by an actual
    /// transcription. Other mismatches are reported through the returned status.
    pub fn update_pho(
        &mut self,
        grammar: &Grammar,
        code: &str,
    ) -> Result<ReconciliationStatus, Error> {
        self.ensure_parsed("pho update")?;

        let status = if !mentions_speaker(&self.content_text(), code) {
            ReconciliationStatus::SpeakerNotInAnnotation
        } else {
            if !self.words.contains_key(code) {
                self.extract_words_by_speaker(grammar, code)?;
            }
            let nb_words = self.words.get(code).map_or(0, Vec::len);

            if nb_words == 0 {
                ReconciliationStatus::NoWordsExtracted
            } else {
                self.reconcile(nb_words)?
            }
        };

        debug!("[{} line {}] {}", self.label(), self.line_no(), status);
        self.status = Some(status);
        Ok(status)
    }

    fn reconcile(&mut self, nb_words: usize) -> Result<ReconciliationStatus, Error> {
        let placeholders = vec![PLACEHOLDER; nb_words];
        let pho = self.pho_indices()?;

        let status = match pho.as_slice() {
            [] => {
                self.prepend_sub_tier(SubTier::pho(&placeholders));
                self.extract_phonetic_transcriptions()?;
                ReconciliationStatus::PhoSubTierAdded
            }
            [idx] => {
                let idx = *idx;
                if self.transcriptions.is_none() {
                    self.extract_phonetic_transcriptions()?;
                }
                let transcriptions = self.transcriptions.as_deref().unwrap_or_default();
                let nb_tokens = transcriptions.len();
                let nb_transcribed = transcriptions.iter().filter(|t| !t.is_placeholder()).count();

                if nb_transcribed == 0 {
                    self.sub_tiers[idx].set_tokens(&placeholders);
                    self.extract_phonetic_transcriptions()?;
                    ReconciliationStatus::NeedsTranscription(match nb_tokens.cmp(&nb_words) {
                        Ordering::Less => PlaceholderChange::Added,
                        Ordering::Greater => PlaceholderChange::Removed,
                        Ordering::Equal => PlaceholderChange::Unchanged,
                    })
                } else {
                    match nb_tokens.cmp(&nb_words) {
                        Ordering::Greater => ReconciliationStatus::MoreTranscriptionsThanWords,
                        Ordering::Less => ReconciliationStatus::FewerTranscriptionsThanWords,
                        Ordering::Equal if nb_transcribed < nb_words => {
                            ReconciliationStatus::NeedsSomeTranscription
                        }
                        Ordering::Equal => ReconciliationStatus::AllTranscribed,
                    }
                }
            }
            _ => ReconciliationStatus::MultiplePhoSubTiers,
        };
        Ok(status)
    }
}
