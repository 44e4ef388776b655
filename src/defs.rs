/// Index of a state or an action.
pub type Discrete = usize;

pub type Continuous = f64;
