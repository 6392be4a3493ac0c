//! Pure aggregation over collected trails.
//!
//! The experiment runner collects trails; turning them into per-hop
//! statistics is a separate, side-effect-free step so report formats can
//! vary without touching the runner.

use std::collections::HashMap;

use crate::model::{ChannelId, ChannelRef, Trail};

/// Counts how often each channel occupies hop `hop` across `trails`,
/// descending by count; ties keep first-seen order. Channels are counted
/// by identity, so a channel that renamed itself mid-experiment is still
/// one channel (the first-seen title is reported).
///
/// Trails shorter than `hop + 1` contribute nothing; with equal-length
/// trails (the runner guarantees this) either every trail counts or none
/// does.
///
/// # Examples
/// ```
/// use warren_core::hop_channel_frequencies;
///
/// let frequencies = hop_channel_frequencies(&[], 0);
/// assert!(frequencies.is_empty());
/// ```
#[must_use]
pub fn hop_channel_frequencies(trails: &[Trail], hop: usize) -> Vec<(ChannelRef, usize)> {
    let mut order: Vec<(ChannelRef, usize)> = Vec::new();
    let mut slots: HashMap<ChannelId, usize> = HashMap::new();
    for trail in trails {
        let Some(hop_entry) = trail.hops().get(hop) else {
            continue;
        };
        let channel = hop_entry.channel();
        if let Some(&slot) = slots.get(channel.id()) {
            if let Some(entry) = order.get_mut(slot) {
                entry.1 += 1;
            }
        } else {
            slots.insert(channel.id().clone(), order.len());
            order.push((channel.clone(), 1));
        }
    }
    order.sort_by(|left, right| right.1.cmp(&left.1));
    order
}
