pub mod college_cost;
