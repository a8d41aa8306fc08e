mod common;

mod tests {
    use pwm_light_programs::bank::{ADDRESS_ALL_CALL, is_bank_address};
    use pwm_light_programs::{BankRegistry, Channel, PwmOutput, RegistryError};

    use crate::common::{RecordingDriver, registry};

    #[test]
    fn test_bank_addresses() {
        assert!(is_bank_address(0x40));
        assert!(is_bank_address(0x7F));
        assert!(!is_bank_address(0x3F));
        assert!(!is_bank_address(0x80));
        assert!(!is_bank_address(ADDRESS_ALL_CALL));
    }

    #[test]
    fn test_registry_rejects_bad_addresses() {
        let mut registry = BankRegistry::<_, 2, 16>::new(RecordingDriver::default());
        assert_eq!(registry.add_bank(0x41), Ok(0));
        assert_eq!(
            registry.add_bank(0x70),
            Err(RegistryError::InvalidAddress(0x70))
        );
        assert_eq!(
            registry.add_bank(0x41),
            Err(RegistryError::DuplicateAddress(0x41))
        );
        assert_eq!(registry.add_bank(0x42), Ok(1));
        assert_eq!(registry.add_bank(0x43), Err(RegistryError::Full));
        assert_eq!(registry.bank_count(), 2);
    }

    #[test]
    fn test_registry_layout() {
        let registry = registry();
        assert_eq!(registry.bank_count(), 2);
        assert_eq!(registry.channel_count(), 32);
        assert_eq!(registry.enabled_count(), 0);

        let bank = registry.bank(1).unwrap();
        assert_eq!(bank.address(), 0x41);
        assert_eq!(bank.name(), "PCA9685_41");
        assert_eq!(bank.channel_count(), 16);
        assert_eq!(registry.channel(1, 3).unwrap().name(), "LED_1_3");
        assert!(registry.channel(1, 16).is_none());
        assert!(registry.channel(2, 0).is_none());
    }

    #[test]
    fn test_apply_all_writes_every_channel() {
        let mut registry = registry();
        registry.channel_mut(0, 1).unwrap().set_enabled(true);
        registry.channel_mut(0, 1).unwrap().set_duty(2_000);

        assert_eq!(registry.apply_all(), 0);
        assert_eq!(registry.driver().writes.len(), 32);
        assert_eq!(registry.enabled_count(), 1);
        assert_eq!(registry.driver().last(0x40, 1), Some(PwmOutput::Duty(2_000)));
        assert_eq!(registry.driver().last(0x41, 1), Some(PwmOutput::FullOff));
    }

    #[test]
    fn test_apply_all_counts_failures() {
        let mut registry = registry();
        registry.driver_mut().fail_address = Some(0x40);
        assert_eq!(registry.apply_all(), 16);
        assert!(registry.apply(3, 0).is_err());
    }

    #[test]
    fn test_pwm_output_mapping() {
        assert_eq!(PwmOutput::for_channel(false, 2_000), PwmOutput::FullOff);
        assert_eq!(PwmOutput::for_channel(true, 0), PwmOutput::FullOff);
        assert_eq!(PwmOutput::for_channel(true, 4_095), PwmOutput::FullOn);
        assert_eq!(PwmOutput::for_channel(true, 1_024), PwmOutput::Duty(1_024));

        assert_eq!(PwmOutput::FullOff.counts(), (0, 4_096));
        assert_eq!(PwmOutput::FullOn.counts(), (4_096, 0));
        assert_eq!(PwmOutput::Duty(1_024).counts(), (0, 1_024));
        assert_eq!(PwmOutput::FullOn.duty(), 4_095);
    }

    #[test]
    fn test_channel_defaults() {
        let channel = Channel::new(0, 7);
        assert_eq!(channel.name(), "LED_0_7");
        assert_eq!(channel.duty(), 0);
        assert!(!channel.is_enabled());
        assert!(!channel.has_program());
    }

    #[test]
    fn test_channel_duty_and_enable() {
        let mut channel = Channel::new(0, 0);
        channel.set_duty(5_000);
        assert_eq!(channel.duty(), 4_095);
        assert_eq!(channel.effective_duty(), 0);

        assert!(channel.toggle());
        assert_eq!(channel.effective_duty(), 4_095);
        assert_eq!(channel.duty_percent(), 100.0);

        channel.set_duty_percent(0.0);
        assert_eq!(channel.duty(), 0);

        channel.reset();
        assert!(!channel.is_enabled());
        assert_eq!(channel.name(), "LED_0_0");
    }

    #[test]
    fn test_channel_name_truncates() {
        let mut channel = Channel::new(0, 0);
        channel.set_name("Engine shed north window lamp number two");
        assert_eq!(channel.name().len(), 32);
        assert!(channel.name().starts_with("Engine shed"));
    }
}
