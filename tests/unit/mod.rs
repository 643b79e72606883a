mod assignment_validation_test;
mod session_generation_test;
mod statistics_test;
