//! OpenWeather adapter
//!
//! Implementation of the `WeatherProvider` port against the OpenWeather 2.5 API.

mod client;

pub use client::OpenWeatherClient;
