pub mod rent_affordability;
