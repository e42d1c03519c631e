use typed_builder::TypedBuilder;

/// Construction-time options for a [`Machine`](crate::Machine).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, TypedBuilder)]
pub struct MachineConfig {
    /// Seed for the generator behind `CXNN`. `None` seeds from OS entropy.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}
