pub mod lease_payment;
