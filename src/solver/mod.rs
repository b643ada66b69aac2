pub mod nsga2;
