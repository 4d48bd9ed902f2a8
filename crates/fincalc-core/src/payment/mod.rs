pub mod loan_payment;
