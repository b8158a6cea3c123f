//! The pull contract implemented by every producer in the graph.
//!
//! A consumer repeatedly asks the outermost producer for samples; each
//! producer pulls from its own inputs, transforms the data into the caller's
//! stream and returns how many samples it wrote. Nothing is pushed.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::stream::SoundStream;

/// A producer that can be shared between a transform and its owner.
///
/// The mutex is the producer's single coarse lock: a render holds it for the
/// whole [`SoundOutput::fill_buffer`] call and every reconfiguration holds it
/// for the mutation, so the two never interleave.
pub type SharedOutput = Arc<Mutex<dyn SoundOutput>>;

/// Wraps a producer for sharing.
///
/// The returned handle keeps its concrete type for reconfiguration and
/// coerces to [`SharedOutput`] when attached to a transform:
///
/// ```rust,ignore
/// let source = shared(MySource::new());
/// mixer.add_input(source.clone());
/// source.lock().set_gain(0.5);
/// ```
pub fn shared<T: SoundOutput>(output: T) -> Arc<Mutex<T>> {
    Arc::new(Mutex::new(output))
}

/// Returns true if both handles refer to the same producer.
pub fn same_output(a: &SharedOutput, b: &SharedOutput) -> bool {
    core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// An object that produces audio on demand.
///
/// Sample rate, channel count and output count may change between pulls but
/// stay fixed for the duration of one. Data is read once: every pull
/// advances the producer by the number of samples it returns.
pub trait SoundOutput: Send + 'static {
    /// Sample rate of the produced audio in Hz.
    fn sample_rate(&self) -> f32;

    /// Number of channels in each output band.
    fn num_channels(&self) -> usize;

    /// Number of parallel output bands.
    fn num_outputs(&self) -> usize;

    /// Returns false once no future pull can produce samples.
    fn has_output_remaining(&self) -> bool;

    /// Writes up to `num_samples` samples into `stream` starting at `start`.
    ///
    /// The caller guarantees that `stream` has at least
    /// [`num_outputs`](Self::num_outputs) bands of at least
    /// [`num_channels`](Self::num_channels) channels and
    /// `start + num_samples` samples. Returns the number of samples written.
    /// Returning 0 does not mean the producer is exhausted unless
    /// [`has_output_remaining`](Self::has_output_remaining) is also false.
    fn fill_buffer(&mut self, stream: &mut SoundStream, start: usize, num_samples: usize) -> usize;

    /// Grows `stream` to fit this producer's output, then fills it.
    ///
    /// This is the entry point consumers should use.
    fn get_samples(&mut self, stream: &mut SoundStream, start: usize, num_samples: usize) -> usize {
        stream.reserve_shape(
            self.num_outputs(),
            self.num_channels(),
            start.saturating_add(num_samples),
        );
        self.fill_buffer(stream, start, num_samples)
    }

    /// Fills the whole of `stream` from index 0.
    fn get_all_samples(&mut self, stream: &mut SoundStream) -> usize {
        let size = stream.size();
        self.get_samples(stream, 0, size)
    }
}

/// A transform that reads from a single upstream producer.
///
/// The upstream producer is referenced, never owned: removing or replacing
/// it leaves the caller's handle untouched.
pub trait SoundInput {
    /// Returns the current upstream producer.
    fn input(&self) -> Option<&SharedOutput>;

    /// Replaces the upstream producer. `None` detaches it.
    fn set_input(&mut self, input: Option<SharedOutput>);

    /// Detaches the upstream producer.
    fn remove_input(&mut self) {
        self.set_input(None);
    }

    /// Returns true if an upstream producer is attached.
    fn has_input(&self) -> bool {
        self.input().is_some()
    }
}
