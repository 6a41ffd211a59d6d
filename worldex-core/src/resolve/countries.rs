//! Embedded ISO 3166-1 reference table: alpha-3 code, short name, and alternative names
//! (official and common forms).

/// One reference entry.
#[derive(Debug, Clone, Copy)]
pub struct CountryEntry {
    /// Alpha-3 code.
    pub alpha3: &'static str,
    /// ISO short name.
    pub name: &'static str,
    /// Official and common alternative names.
    pub aliases: &'static [&'static str],
}

const fn c(
    alpha3: &'static str,
    name: &'static str,
    aliases: &'static [&'static str],
) -> CountryEntry {
    CountryEntry {
        alpha3,
        name,
        aliases,
    }
}

/// All reference entries in ISO short-name order.
pub static COUNTRIES: &[CountryEntry] = &[
    c("AFG", "Afghanistan", &["Islamic Republic of Afghanistan"]),
    c("ALA", "Åland Islands", &[]),
    c("ALB", "Albania", &["Republic of Albania"]),
    c("DZA", "Algeria", &["People's Democratic Republic of Algeria"]),
    c("ASM", "American Samoa", &[]),
    c("AND", "Andorra", &["Principality of Andorra"]),
    c("AGO", "Angola", &["Republic of Angola"]),
    c("AIA", "Anguilla", &[]),
    c("ATA", "Antarctica", &[]),
    c("ATG", "Antigua and Barbuda", &[]),
    c("ARG", "Argentina", &["Argentine Republic"]),
    c("ARM", "Armenia", &["Republic of Armenia"]),
    c("ABW", "Aruba", &[]),
    c("AUS", "Australia", &[]),
    c("AUT", "Austria", &["Republic of Austria"]),
    c("AZE", "Azerbaijan", &["Republic of Azerbaijan"]),
    c("BHS", "Bahamas", &["Commonwealth of the Bahamas", "Bahamas, The"]),
    c("BHR", "Bahrain", &["Kingdom of Bahrain"]),
    c("BGD", "Bangladesh", &["People's Republic of Bangladesh"]),
    c("BRB", "Barbados", &[]),
    c("BLR", "Belarus", &["Republic of Belarus"]),
    c("BEL", "Belgium", &["Kingdom of Belgium"]),
    c("BLZ", "Belize", &[]),
    c("BEN", "Benin", &["Republic of Benin"]),
    c("BMU", "Bermuda", &[]),
    c("BTN", "Bhutan", &["Kingdom of Bhutan"]),
    c("BOL", "Bolivia, Plurinational State of", &["Plurinational State of Bolivia", "Bolivia"]),
    c("BES", "Bonaire, Sint Eustatius and Saba", &["Bonaire"]),
    c("BIH", "Bosnia and Herzegovina", &["Republic of Bosnia and Herzegovina", "Bosnia-Herzegovina"]),
    c("BWA", "Botswana", &["Republic of Botswana"]),
    c("BVT", "Bouvet Island", &[]),
    c("BRA", "Brazil", &["Federative Republic of Brazil"]),
    c("IOT", "British Indian Ocean Territory", &[]),
    c("BRN", "Brunei Darussalam", &["Brunei"]),
    c("BGR", "Bulgaria", &["Republic of Bulgaria"]),
    c("BFA", "Burkina Faso", &[]),
    c("BDI", "Burundi", &["Republic of Burundi"]),
    c("CPV", "Cabo Verde", &["Republic of Cabo Verde", "Cape Verde"]),
    c("KHM", "Cambodia", &["Kingdom of Cambodia"]),
    c("CMR", "Cameroon", &["Republic of Cameroon"]),
    c("CAN", "Canada", &[]),
    c("CYM", "Cayman Islands", &[]),
    c("CAF", "Central African Republic", &["Central African Rep."]),
    c("TCD", "Chad", &["Republic of Chad"]),
    c("CHL", "Chile", &["Republic of Chile"]),
    c("CHN", "China", &["People's Republic of China"]),
    c("CXR", "Christmas Island", &[]),
    c("CCK", "Cocos (Keeling) Islands", &[]),
    c("COL", "Colombia", &["Republic of Colombia"]),
    c("COM", "Comoros", &["Union of the Comoros"]),
    c("COG", "Congo", &["Republic of the Congo", "Congo, Republic of"]),
    c("COD", "Congo, The Democratic Republic of the", &["Democratic Republic of the Congo", "DR Congo"]),
    c("COK", "Cook Islands", &[]),
    c("CRI", "Costa Rica", &["Republic of Costa Rica"]),
    c("CIV", "Côte d'Ivoire", &["Republic of Côte d'Ivoire", "Ivory Coast", "Cote d'Ivoire"]),
    c("HRV", "Croatia", &["Republic of Croatia"]),
    c("CUB", "Cuba", &["Republic of Cuba"]),
    c("CUW", "Curaçao", &["Curacao"]),
    c("CYP", "Cyprus", &["Republic of Cyprus"]),
    c("CZE", "Czechia", &["Czech Republic"]),
    c("DNK", "Denmark", &["Kingdom of Denmark"]),
    c("DJI", "Djibouti", &["Republic of Djibouti"]),
    c("DMA", "Dominica", &["Commonwealth of Dominica"]),
    c("DOM", "Dominican Republic", &["Dominican Rep."]),
    c("ECU", "Ecuador", &["Republic of Ecuador"]),
    c("EGY", "Egypt", &["Arab Republic of Egypt", "Egypt, Arab Rep."]),
    c("SLV", "El Salvador", &["Republic of El Salvador"]),
    c("GNQ", "Equatorial Guinea", &["Republic of Equatorial Guinea"]),
    c("ERI", "Eritrea", &["the State of Eritrea"]),
    c("EST", "Estonia", &["Republic of Estonia"]),
    c("SWZ", "Eswatini", &["Kingdom of Eswatini", "Swaziland"]),
    c("ETH", "Ethiopia", &["Federal Democratic Republic of Ethiopia"]),
    c("FLK", "Falkland Islands (Malvinas)", &["Falkland Islands"]),
    c("FRO", "Faroe Islands", &[]),
    c("FJI", "Fiji", &["Republic of Fiji"]),
    c("FIN", "Finland", &["Republic of Finland"]),
    c("FRA", "France", &["French Republic"]),
    c("GUF", "French Guiana", &[]),
    c("PYF", "French Polynesia", &[]),
    c("ATF", "French Southern Territories", &[]),
    c("GAB", "Gabon", &["Gabonese Republic"]),
    c("GMB", "Gambia", &["Republic of the Gambia", "Gambia, The"]),
    c("GEO", "Georgia", &[]),
    c("DEU", "Germany", &["Federal Republic of Germany"]),
    c("GHA", "Ghana", &["Republic of Ghana"]),
    c("GIB", "Gibraltar", &[]),
    c("GRC", "Greece", &["Hellenic Republic"]),
    c("GRL", "Greenland", &[]),
    c("GRD", "Grenada", &[]),
    c("GLP", "Guadeloupe", &[]),
    c("GUM", "Guam", &[]),
    c("GTM", "Guatemala", &["Republic of Guatemala"]),
    c("GGY", "Guernsey", &[]),
    c("GIN", "Guinea", &["Republic of Guinea"]),
    c("GNB", "Guinea-Bissau", &["Republic of Guinea-Bissau"]),
    c("GUY", "Guyana", &["Republic of Guyana"]),
    c("HTI", "Haiti", &["Republic of Haiti"]),
    c("HMD", "Heard Island and McDonald Islands", &[]),
    c("VAT", "Holy See (Vatican City State)", &["Holy See", "Vatican City"]),
    c("HND", "Honduras", &["Republic of Honduras"]),
    c("HKG", "Hong Kong", &["Hong Kong Special Administrative Region of China", "Hong Kong SAR, China"]),
    c("HUN", "Hungary", &[]),
    c("ISL", "Iceland", &["Republic of Iceland"]),
    c("IND", "India", &["Republic of India"]),
    c("IDN", "Indonesia", &["Republic of Indonesia"]),
    c("IRN", "Iran, Islamic Republic of", &["Islamic Republic of Iran", "Iran"]),
    c("IRQ", "Iraq", &["Republic of Iraq"]),
    c("IRL", "Ireland", &[]),
    c("IMN", "Isle of Man", &[]),
    c("ISR", "Israel", &["State of Israel"]),
    c("ITA", "Italy", &["Italian Republic"]),
    c("JAM", "Jamaica", &[]),
    c("JPN", "Japan", &[]),
    c("JEY", "Jersey", &[]),
    c("JOR", "Jordan", &["Hashemite Kingdom of Jordan"]),
    c("KAZ", "Kazakhstan", &["Republic of Kazakhstan"]),
    c("KEN", "Kenya", &["Republic of Kenya"]),
    c("KIR", "Kiribati", &["Republic of Kiribati"]),
    c("PRK", "Korea, Democratic People's Republic of", &["Democratic People's Republic of Korea"]),
    c("KOR", "Korea, Republic of", &["Republic of Korea", "Korea, Rep."]),
    c("KWT", "Kuwait", &["State of Kuwait"]),
    c("KGZ", "Kyrgyzstan", &["Kyrgyz Republic"]),
    c("LAO", "Lao People's Democratic Republic", &["Laos"]),
    c("LVA", "Latvia", &["Republic of Latvia"]),
    c("LBN", "Lebanon", &["Lebanese Republic"]),
    c("LSO", "Lesotho", &["Kingdom of Lesotho"]),
    c("LBR", "Liberia", &["Republic of Liberia"]),
    c("LBY", "Libya", &[]),
    c("LIE", "Liechtenstein", &["Principality of Liechtenstein"]),
    c("LTU", "Lithuania", &["Republic of Lithuania"]),
    c("LUX", "Luxembourg", &["Grand Duchy of Luxembourg"]),
    c("MAC", "Macao", &["Macao Special Administrative Region of China", "Macau"]),
    c("MDG", "Madagascar", &["Republic of Madagascar"]),
    c("MWI", "Malawi", &["Republic of Malawi"]),
    c("MYS", "Malaysia", &[]),
    c("MDV", "Maldives", &["Republic of Maldives"]),
    c("MLI", "Mali", &["Republic of Mali"]),
    c("MLT", "Malta", &["Republic of Malta"]),
    c("MHL", "Marshall Islands", &["Republic of the Marshall Islands"]),
    c("MTQ", "Martinique", &[]),
    c("MRT", "Mauritania", &["Islamic Republic of Mauritania"]),
    c("MUS", "Mauritius", &["Republic of Mauritius"]),
    c("MYT", "Mayotte", &[]),
    c("MEX", "Mexico", &["United Mexican States"]),
    c("FSM", "Micronesia, Federated States of", &["Federated States of Micronesia"]),
    c("MDA", "Moldova, Republic of", &["Republic of Moldova", "Moldova"]),
    c("MCO", "Monaco", &["Principality of Monaco"]),
    c("MNG", "Mongolia", &[]),
    c("MNE", "Montenegro", &[]),
    c("MSR", "Montserrat", &[]),
    c("MAR", "Morocco", &["Kingdom of Morocco"]),
    c("MOZ", "Mozambique", &["Republic of Mozambique"]),
    c("MMR", "Myanmar", &["Republic of Myanmar", "Burma"]),
    c("NAM", "Namibia", &["Republic of Namibia"]),
    c("NRU", "Nauru", &["Republic of Nauru"]),
    c("NPL", "Nepal", &["Federal Democratic Republic of Nepal"]),
    c("NLD", "Netherlands", &["Kingdom of the Netherlands"]),
    c("NCL", "New Caledonia", &[]),
    c("NZL", "New Zealand", &[]),
    c("NIC", "Nicaragua", &["Republic of Nicaragua"]),
    c("NER", "Niger", &["Republic of the Niger"]),
    c("NGA", "Nigeria", &["Federal Republic of Nigeria"]),
    c("NIU", "Niue", &[]),
    c("NFK", "Norfolk Island", &[]),
    c("MKD", "North Macedonia", &["Republic of North Macedonia"]),
    c("MNP", "Northern Mariana Islands", &["Commonwealth of the Northern Mariana Islands"]),
    c("NOR", "Norway", &["Kingdom of Norway"]),
    c("OMN", "Oman", &["Sultanate of Oman"]),
    c("PAK", "Pakistan", &["Islamic Republic of Pakistan"]),
    c("PLW", "Palau", &["Republic of Palau"]),
    c("PSE", "Palestine, State of", &["the State of Palestine"]),
    c("PAN", "Panama", &["Republic of Panama"]),
    c("PNG", "Papua New Guinea", &["Independent State of Papua New Guinea"]),
    c("PRY", "Paraguay", &["Republic of Paraguay"]),
    c("PER", "Peru", &["Republic of Peru"]),
    c("PHL", "Philippines", &["Republic of the Philippines"]),
    c("PCN", "Pitcairn", &[]),
    c("POL", "Poland", &["Republic of Poland"]),
    c("PRT", "Portugal", &["Portuguese Republic"]),
    c("PRI", "Puerto Rico", &[]),
    c("QAT", "Qatar", &["State of Qatar"]),
    c("REU", "Réunion", &["Reunion"]),
    c("ROU", "Romania", &[]),
    c("RUS", "Russian Federation", &["Russia"]),
    c("RWA", "Rwanda", &["Rwandese Republic"]),
    c("BLM", "Saint Barthélemy", &[]),
    c("SHN", "Saint Helena, Ascension and Tristan da Cunha", &["Saint Helena"]),
    c("KNA", "Saint Kitts and Nevis", &["St. Kitts and Nevis"]),
    c("LCA", "Saint Lucia", &["St. Lucia"]),
    c("MAF", "Saint Martin (French part)", &[]),
    c("SPM", "Saint Pierre and Miquelon", &[]),
    c("VCT", "Saint Vincent and the Grenadines", &["St. Vincent and the Grenadines"]),
    c("WSM", "Samoa", &["Independent State of Samoa"]),
    c("SMR", "San Marino", &["Republic of San Marino"]),
    c("STP", "Sao Tome and Principe", &["Democratic Republic of Sao Tome and Principe"]),
    c("SAU", "Saudi Arabia", &["Kingdom of Saudi Arabia"]),
    c("SEN", "Senegal", &["Republic of Senegal"]),
    c("SRB", "Serbia", &["Republic of Serbia"]),
    c("SYC", "Seychelles", &["Republic of Seychelles"]),
    c("SLE", "Sierra Leone", &["Republic of Sierra Leone"]),
    c("SGP", "Singapore", &["Republic of Singapore"]),
    c("SXM", "Sint Maarten (Dutch part)", &["Sint Maarten"]),
    c("SVK", "Slovakia", &["Slovak Republic"]),
    c("SVN", "Slovenia", &["Republic of Slovenia"]),
    c("SLB", "Solomon Islands", &[]),
    c("SOM", "Somalia", &["Federal Republic of Somalia"]),
    c("ZAF", "South Africa", &["Republic of South Africa"]),
    c("SGS", "South Georgia and the South Sandwich Islands", &[]),
    c("SSD", "South Sudan", &["Republic of South Sudan"]),
    c("ESP", "Spain", &["Kingdom of Spain"]),
    c("LKA", "Sri Lanka", &["Democratic Socialist Republic of Sri Lanka"]),
    c("SDN", "Sudan", &["Republic of the Sudan"]),
    c("SUR", "Suriname", &["Republic of Suriname"]),
    c("SJM", "Svalbard and Jan Mayen", &[]),
    c("SWE", "Sweden", &["Kingdom of Sweden"]),
    c("CHE", "Switzerland", &["Swiss Confederation"]),
    c("SYR", "Syrian Arab Republic", &["Syria"]),
    c("TWN", "Taiwan, Province of China", &["Taiwan"]),
    c("TJK", "Tajikistan", &["Republic of Tajikistan"]),
    c("TZA", "Tanzania, United Republic of", &["United Republic of Tanzania", "Tanzania"]),
    c("THA", "Thailand", &["Kingdom of Thailand"]),
    c("TLS", "Timor-Leste", &["Democratic Republic of Timor-Leste", "East Timor"]),
    c("TGO", "Togo", &["Togolese Republic"]),
    c("TKL", "Tokelau", &[]),
    c("TON", "Tonga", &["Kingdom of Tonga"]),
    c("TTO", "Trinidad and Tobago", &["Republic of Trinidad and Tobago"]),
    c("TUN", "Tunisia", &["Republic of Tunisia"]),
    c("TUR", "Türkiye", &["Republic of Türkiye", "Turkey"]),
    c("TKM", "Turkmenistan", &[]),
    c("TCA", "Turks and Caicos Islands", &[]),
    c("TUV", "Tuvalu", &[]),
    c("UGA", "Uganda", &["Republic of Uganda"]),
    c("UKR", "Ukraine", &[]),
    c("ARE", "United Arab Emirates", &["UAE"]),
    c("GBR", "United Kingdom", &["United Kingdom of Great Britain and Northern Ireland"]),
    c("USA", "United States", &["United States of America"]),
    c("UMI", "United States Minor Outlying Islands", &[]),
    c("URY", "Uruguay", &["Eastern Republic of Uruguay"]),
    c("UZB", "Uzbekistan", &["Republic of Uzbekistan"]),
    c("VUT", "Vanuatu", &["Republic of Vanuatu"]),
    c("VEN", "Venezuela, Bolivarian Republic of", &["Bolivarian Republic of Venezuela", "Venezuela"]),
    c("VNM", "Viet Nam", &["Socialist Republic of Viet Nam", "Vietnam"]),
    c("VGB", "Virgin Islands, British", &["British Virgin Islands"]),
    c("VIR", "Virgin Islands, U.S.", &["Virgin Islands of the United States"]),
    c("WLF", "Wallis and Futuna", &[]),
    c("ESH", "Western Sahara", &[]),
    c("YEM", "Yemen", &["Republic of Yemen"]),
    c("ZMB", "Zambia", &["Republic of Zambia"]),
    c("ZWE", "Zimbabwe", &["Republic of Zimbabwe"]),
];
