use log::{debug, trace};

use crate::synth::voice::Voice;

/*
Voice Allocation
================

A channel owns a fixed pool of voices. Every note-on must land on exactly
one of them, chosen in strict priority order:

    1. RE-TRIGGER   an active voice already sounding this note is re-armed
    2. FREE         otherwise the first idle voice is armed
    3. STEAL        otherwise the least recently touched voice is reset
                    and armed, whatever envelope stage it is in

"Touched" is tracked with a monotonically increasing counter. Every note-on
bumps it and stamps the chosen voice, so the smallest stamp is the oldest
decision. Ties (only possible before the pool has filled) go to the lowest
index.

    note_on(60) → v0 [age 1]
    note_on(62) → v1 [age 2]       pool of 2 now full
    note_on(64) → steal v0 [age 3]
    note_on(66) → steal v1 [age 4]

Legato
------

The allocator also keeps the list of keys currently held down. A note-on is
legato when that list was non-empty just before it. Legato only affects how
the voice starts (glide, oscillator phase); it never changes which voice is
picked. The list never holds duplicates, and releasing a key that isn't in
it is a no-op.
*/

/// Preallocated so holding every MIDI key never reallocates.
const MAX_HELD_NOTES: usize = 128;

pub struct VoiceAllocator {
    voices: Vec<Voice>,
    ages: Vec<u64>,
    age_counter: u64,
    held_notes: Vec<u8>,
}

impl VoiceAllocator {
    pub fn new(voices: Vec<Voice>) -> Self {
        let ages = vec![0; voices.len()];
        Self {
            voices,
            ages,
            age_counter: 0,
            held_notes: Vec::with_capacity(MAX_HELD_NOTES),
        }
    }

    /// Start `note` on some voice and return that voice's index.
    pub fn note_on(&mut self, note: u8, velocity: u8) -> usize {
        let legato = !self.held_notes.is_empty();

        let index = if let Some(index) = self
            .voices
            .iter()
            .position(|v| v.is_active() && v.note() == Some(note))
        {
            trace!("re-trigger note {note} on voice {index}");
            index
        } else if let Some(index) = self.voices.iter().position(|v| !v.is_active()) {
            trace!("note {note} on free voice {index}");
            index
        } else {
            let index = self.oldest_voice();
            debug!(
                "stealing voice {index} (note {:?}) for note {note}",
                self.voices[index].note()
            );
            self.voices[index].reset();
            index
        };

        self.voices[index].note_on(note, velocity, legato);

        self.held_notes.retain(|&held| held != note);
        if self.held_notes.len() < MAX_HELD_NOTES {
            self.held_notes.push(note);
        }

        self.age_counter += 1;
        self.ages[index] = self.age_counter;

        index
    }

    /// Release every active voice holding `note`.
    pub fn note_off(&mut self, note: u8) {
        self.held_notes.retain(|&held| held != note);

        for voice in self.voices.iter_mut() {
            if voice.is_active() && voice.note() == Some(note) {
                voice.note_off();
            }
        }
    }

    /// Forget held keys and release every active voice.
    pub fn all_notes_off(&mut self) {
        self.held_notes.clear();

        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.note_off();
        }
    }

    // Smallest age wins; `min_by_key` keeps the first of equal keys.
    fn oldest_voice(&self) -> usize {
        self.ages
            .iter()
            .enumerate()
            .min_by_key(|&(_, age)| *age)
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn held_notes(&self) -> &[u8] {
        &self.held_notes
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn voices_mut(&mut self) -> &mut [Voice] {
        &mut self.voices
    }

    pub fn max_voices(&self) -> usize {
        self.voices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn allocator(max_voices: usize) -> VoiceAllocator {
        let voices = (0..max_voices)
            .map(|i| Voice::new(SAMPLE_RATE, 440.0, 32, i as u64))
            .collect();
        VoiceAllocator::new(voices)
    }

    fn sounding_notes(alloc: &VoiceAllocator) -> Vec<u8> {
        let mut notes: Vec<u8> = alloc
            .voices()
            .iter()
            .filter(|v| v.is_active())
            .filter_map(|v| v.note())
            .collect();
        notes.sort_unstable();
        notes
    }

    #[test]
    fn oldest_voice_is_stolen_when_pool_is_full() {
        let mut alloc = allocator(4);
        for note in [60, 62, 64, 66, 68] {
            alloc.note_on(note, 100);
        }

        assert_eq!(sounding_notes(&alloc), vec![62, 64, 66, 68]);
        assert_eq!(alloc.active_voice_count(), 4);
    }

    #[test]
    fn steals_regardless_of_envelope_stage() {
        let mut alloc = allocator(2);
        alloc.note_on(60, 100);
        alloc.note_on(62, 100);
        // 62 is now releasing, 60 is still held; 60 is older and goes first
        alloc.note_off(62);

        let stolen = alloc.note_on(64, 100);
        assert_eq!(stolen, 0);
        assert_eq!(sounding_notes(&alloc), vec![62, 64]);
    }

    #[test]
    fn retrigger_reuses_the_same_voice() {
        let mut alloc = allocator(4);
        let first = alloc.note_on(60, 100);
        alloc.note_on(62, 100);
        let again = alloc.note_on(60, 80);

        assert_eq!(first, again);
        assert_eq!(alloc.active_voice_count(), 2);
    }

    #[test]
    fn retrigger_refreshes_age() {
        let mut alloc = allocator(2);
        alloc.note_on(60, 100); // v0
        alloc.note_on(62, 100); // v1
        alloc.note_on(60, 100); // v0 touched again

        let stolen = alloc.note_on(64, 100);
        assert_eq!(stolen, 1, "v1 is now the oldest");
    }

    #[test]
    fn free_voice_preferred_over_steal() {
        let mut alloc = allocator(3);
        alloc.note_on(60, 100);
        let second = alloc.note_on(62, 100);
        assert_eq!(second, 1);
    }

    #[test]
    fn note_off_for_unknown_note_is_a_no_op() {
        let mut alloc = allocator(4);
        alloc.note_on(60, 100);
        alloc.note_off(72);

        assert_eq!(alloc.held_notes(), &[60]);
        assert_eq!(alloc.active_voice_count(), 1);
    }

    #[test]
    fn note_off_releases_without_deactivating() {
        let mut alloc = allocator(4);
        alloc.note_on(60, 100);
        alloc.note_off(60);

        assert!(alloc.held_notes().is_empty());
        assert_eq!(alloc.active_voice_count(), 1);
    }

    #[test]
    fn held_notes_have_no_duplicates() {
        let mut alloc = allocator(4);
        alloc.note_on(60, 100);
        alloc.note_on(64, 100);
        alloc.note_on(60, 100);

        assert_eq!(alloc.held_notes(), &[64, 60]);

        alloc.note_off(60);
        assert_eq!(alloc.held_notes(), &[64]);
    }

    #[test]
    fn all_notes_off_clears_held_list() {
        let mut alloc = allocator(4);
        alloc.note_on(60, 100);
        alloc.note_on(64, 100);
        alloc.all_notes_off();

        assert!(alloc.held_notes().is_empty());
        assert_eq!(alloc.active_voice_count(), 2, "voices ring out through release");
    }

    #[test]
    fn active_count_never_exceeds_pool() {
        let mut alloc = allocator(3);
        for note in 40..80 {
            alloc.note_on(note, 90);
            assert!(alloc.active_voice_count() <= 3);
        }
        assert_eq!(alloc.max_voices(), 3);
    }

    #[test]
    fn single_voice_pool_always_steals_voice_zero() {
        let mut alloc = allocator(1);
        assert_eq!(alloc.note_on(60, 100), 0);
        assert_eq!(alloc.note_on(61, 100), 0);
        assert_eq!(sounding_notes(&alloc), vec![61]);
    }
}
