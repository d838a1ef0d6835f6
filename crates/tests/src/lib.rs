pub mod fixtures;

#[cfg(test)]
mod auth_tests;
#[cfg(test)]
mod leave_request_tests;
#[cfg(test)]
mod team_tests;
#[cfg(test)]
mod document_tests;
#[cfg(test)]
mod chat_tests;
#[cfg(test)]
mod wifi_bill_tests;
#[cfg(test)]
mod live_tests;
