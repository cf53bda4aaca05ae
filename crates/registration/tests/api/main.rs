mod dynamic_config_test;
mod helpers;
mod pricing_periods_test;
mod quote_test;
