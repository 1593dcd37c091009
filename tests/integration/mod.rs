mod exchange_rates;
