mod support;
mod voice;
