fn main() -> Result<(), shadow_rs::ShadowError> {
    drop(shadow_rs::ShadowBuilder::builder().build()?);
    Ok(())
}
