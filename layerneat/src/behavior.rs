/// The problem-specific half of an individual.
///
/// A `Behavior` connects a network to whatever it is
/// controlling: it produces the network's inputs, acts
/// on its outputs, and decides when the individual is
/// done and how well it did.
///
/// Each step, the population calls [`update_sensors`], feeds
/// every returned row through the individual's network, and
/// passes the resulting rows (one per sensor row, in order)
/// to [`act`]. Once [`is_alive`] returns `false` the individual
/// is no longer stepped, and [`fitness`] is read when the
/// generation is advanced.
///
/// [`update_sensors`]: Behavior::update_sensors
/// [`act`]: Behavior::act
/// [`is_alive`]: Behavior::is_alive
/// [`fitness`]: Behavior::fitness
pub trait Behavior {
    /// Returns the network inputs for this step, one row per
    /// input pattern. Every row must have as many values as
    /// the network has inputs.
    fn update_sensors(&mut self) -> Vec<Vec<f32>>;

    /// Acts on the network outputs of this step.
    fn act(&mut self, controls: &[Vec<f32>]);

    /// Whether the individual should keep being stepped.
    fn is_alive(&self) -> bool;

    /// The individual's score. Should be non-negative.
    fn fitness(&self) -> f32;

    /// Returns an independent copy of this behavior, to
    /// be used by another individual or an offspring.
    fn copy(&self) -> Self
    where
        Self: Sized;

    /// Returns a copy that will replay the individual's run:
    /// same initial conditions, no fresh randomness.
    fn copy_for_replay(&self) -> Self
    where
        Self: Sized,
    {
        self.copy()
    }

    /// Called after every step of an individual.
    fn render(&mut self) {}

    /// Whether the individual has solved the problem.
    fn solution_found(&self) -> bool {
        false
    }
}
