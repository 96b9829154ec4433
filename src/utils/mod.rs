pub mod subsets;
