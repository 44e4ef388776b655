pub mod mc_methods;
pub mod policy_evaluation;
