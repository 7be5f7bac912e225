
#[cfg(test)]
mod navigation;
