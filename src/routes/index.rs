pub mod controllers;

#[cfg(test)]
mod tests;
