//! Routing between logical channels and device channels.

use std::collections::HashMap;

/// One direction of a channel routing: each source maps to at most one
/// target and each target is claimed by at most one source.
#[derive(Debug, Clone, Default, PartialEq)]
struct ChannelMap {
    forward: HashMap<usize, usize>,
    claimed: HashMap<usize, usize>,
}

impl ChannelMap {
    fn set(&mut self, source: usize, target: usize) {
        if let Some(old_target) = self.forward.remove(&source) {
            self.claimed.remove(&old_target);
        }
        if let Some(old_source) = self.claimed.remove(&target) {
            self.forward.remove(&old_source);
        }
        self.forward.insert(source, target);
        self.claimed.insert(target, source);
    }

    fn remove(&mut self, source: usize) -> Option<usize> {
        let target = self.forward.remove(&source)?;
        self.claimed.remove(&target);
        Some(target)
    }

    fn contains(&self, source: usize) -> bool {
        self.forward.contains_key(&source)
    }

    /// Explicit mapping, else identity unless another source claimed it.
    fn resolve(&self, source: usize) -> Option<usize> {
        if let Some(&target) = self.forward.get(&source) {
            return Some(target);
        }
        match self.claimed.get(&source) {
            Some(_) => None,
            None => Some(source),
        }
    }

    fn clear(&mut self) {
        self.forward.clear();
        self.claimed.clear();
    }
}

/// Maps input channels to output channels and back.
///
/// Each direction is independent. A channel without an explicit mapping
/// routes to the channel with the same index, unless some other channel has
/// explicitly claimed that index, in which case it is unrouted.
///
/// ```rust
/// use auralis_spatial::ChannelIOMap;
///
/// let mut map = ChannelIOMap::new();
/// map.set_input_mapping(0, 1);
/// assert_eq!(map.output_for_input(0), Some(1));
/// assert_eq!(map.output_for_input(1), None);   // output 1 is taken
/// assert_eq!(map.output_for_input(2), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelIOMap {
    input_to_output: ChannelMap,
    output_to_input: ChannelMap,
}

impl ChannelIOMap {
    /// Creates a map with no explicit mappings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `input` to `output`, replacing any mapping either side had.
    pub fn set_input_mapping(&mut self, input: usize, output: usize) {
        self.input_to_output.set(input, output);
    }

    /// Routes `output` from `input`, replacing any mapping either side had.
    pub fn set_output_mapping(&mut self, output: usize, input: usize) {
        self.output_to_input.set(output, input);
    }

    /// Sets both directions so `input` and `output` refer to each other.
    pub fn set_mapping(&mut self, input: usize, output: usize) {
        self.set_input_mapping(input, output);
        self.set_output_mapping(output, input);
    }

    /// Removes the explicit mapping of `input`. Returns the old output.
    pub fn remove_input_mapping(&mut self, input: usize) -> Option<usize> {
        self.input_to_output.remove(input)
    }

    /// Removes the explicit mapping of `output`. Returns the old input.
    pub fn remove_output_mapping(&mut self, output: usize) -> Option<usize> {
        self.output_to_input.remove(output)
    }

    /// Returns true if `input` has an explicit mapping.
    pub fn has_input_mapping(&self, input: usize) -> bool {
        self.input_to_output.contains(input)
    }

    /// Returns true if `output` has an explicit mapping.
    pub fn has_output_mapping(&self, output: usize) -> bool {
        self.output_to_input.contains(output)
    }

    /// Resolves the output channel fed by `input`. `None` means silence.
    pub fn output_for_input(&self, input: usize) -> Option<usize> {
        self.input_to_output.resolve(input)
    }

    /// Resolves the input channel feeding `output`. `None` means silence.
    pub fn input_for_output(&self, output: usize) -> Option<usize> {
        self.output_to_input.resolve(output)
    }

    /// Iterates over the explicit input to output mappings, in no order.
    pub fn input_mappings(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.input_to_output.forward.iter().map(|(&i, &o)| (i, o))
    }

    /// Removes every explicit mapping.
    pub fn clear(&mut self) {
        self.input_to_output.clear();
        self.output_to_input.clear();
    }
}
