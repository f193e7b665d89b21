mod voice_settings;
